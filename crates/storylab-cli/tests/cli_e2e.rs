#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.temp.path().join("data")
    }

    fn export_dir(&self) -> PathBuf {
        self.temp.path().join("exports")
    }

    fn cmd(&self, user: &str) -> Command {
        let mut cmd = Command::new(cargo_bin("storylab"));
        cmd.env("STORYLAB_DATA_DIR", self.data_dir())
            .env("STORYLAB_EXPORT_DIR", self.export_dir())
            .env("STORYLAB_USER", user)
            .env("HOME", self.temp.path())
            .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env_remove("STORYLAB_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, user: &str, args: &[&str]) -> String {
        let out = self.cmd(user).args(args).assert().success();
        String::from_utf8(out.get_output().stdout.clone()).unwrap()
    }

    /// Creates a book and returns its id as printed by the CLI.
    fn new_book(&self, user: &str, title: &str) -> String {
        let out = self.run(user, &["book", "new", title]);
        let start = out.rfind('(').unwrap() + 1;
        let end = out.rfind(')').unwrap();
        out[start..end].to_string()
    }
}

fn book_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_create_and_list_books() {
    let env = Env::new();
    env.cmd("ana")
        .args(["book", "new", "The Long Voyage"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Created book The Long Voyage ("));
    let id = env.new_book("ana", "Harbour");

    let listing = env.run("ana", &["book", "list"]);
    assert!(listing.contains("The Long Voyage"));
    assert!(listing.contains(&id[..8]));
    assert_eq!(book_files(&env.data_dir()).len(), 2);

    env.cmd("bob")
        .args(["book", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books yet."));
}

#[test]
fn test_outline_and_corkboard_workflow() {
    let env = Env::new();
    env.new_book("ana", "Voyage");

    env.run("ana", &["part", "voyage", "Departure"]);
    env.run("ana", &["chapter", "voyage", "Harbour", "--part", "Departure"]);
    env.run("ana", &["chapter", "voyage", "Storm", "--part", "departure"]);
    env.run("ana", &["chapter", "voyage", "Epilogue"]);

    let outline = env.run("ana", &["outline", "voyage"]);
    assert!(outline.contains("Departure\n    1. Harbour\n    2. Storm\n"));
    assert!(outline.contains("(no part)\n    3. Epilogue\n"));

    env.run("ana", &["board", "add", "voyage", "Plot"]);
    env.run("ana", &["card", "add", "voyage", "Arrival", "--board", "Plot"]);
    env.run("ana", &["card", "add", "voyage", "Wreck", "--board", "Plot"]);
    env.run(
        "ana",
        &["card", "move", "voyage", "Wreck", "--board", "Plot", "--before", "Arrival"],
    );

    let cards = env.run("ana", &["card", "list", "voyage", "--board", "Plot"]);
    let wreck = cards.find("Wreck").unwrap();
    let arrival = cards.find("Arrival").unwrap();
    assert!(wreck < arrival);

    env.run("ana", &["board", "rebalance", "voyage", "--board", "Plot"]);
    let after = env.run("ana", &["card", "list", "voyage", "--board", "Plot"]);
    assert!(after.find("Wreck").unwrap() < after.find("Arrival").unwrap());
}

#[test]
fn test_grid_rejects_intensity_above_three() {
    let env = Env::new();
    env.new_book("ana", "Voyage");
    env.run("ana", &["chapter", "voyage", "Harbour"]);
    env.run("ana", &["theme", "voyage", "Loss"]);

    env.cmd("ana")
        .args(["grid", "voyage", "Harbour", "Loss", "4"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid input"));
    env.run("ana", &["grid", "voyage", "Harbour", "Loss", "2"]);
    let show = env.run("ana", &["book", "show", "voyage"]);
    assert!(show.contains("grid cells   1"));
}

#[test]
fn test_export_import_round_trip() {
    let env = Env::new();
    env.new_book("ana", "Voyage");
    env.run("ana", &["chapter", "voyage", "Harbour"]);
    env.run("ana", &["chapter", "voyage", "Storm"]);
    env.run("ana", &["theme", "voyage", "Loss"]);
    env.run("ana", &["grid", "voyage", "Storm", "Loss", "3"]);
    env.run("ana", &["card", "add", "voyage", "Squall", "--chapter", "Storm"]);

    env.cmd("ana")
        .args(["export", "voyage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported Voyage to"));
    let file = env.export_dir().join("voyage-template.json");
    assert!(file.exists());

    env.new_book("ana", "Copy");
    env.cmd("ana")
        .args(["import", "copy", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported template into Copy: 0 parts, 2 chapters, 1 themes, 1 cards, 1 grid cells",
        ));

    let original = env.run("ana", &["export", "voyage", "--stdout"]);
    let copy = env.run("ana", &["export", "copy", "--stdout"]);
    let mut original: serde_json::Value = serde_json::from_str(&original).unwrap();
    let copy: serde_json::Value = serde_json::from_str(&copy).unwrap();
    original["book"]["title"] = serde_json::Value::from("Copy");
    assert_eq!(original, copy);
}

#[test]
fn test_import_into_someone_elses_book_fails() {
    let env = Env::new();
    let id = env.new_book("ana", "Voyage");
    env.run("ana", &["chapter", "voyage", "Harbour"]);
    let before = env.run("ana", &["export", "voyage", "--stdout"]);

    let template = env.temp.path().join("t.json");
    fs::write(&template, r#"{ "book": { "title": "Hijack" } }"#).unwrap();

    env.cmd("bob")
        .args(["import", &id, template.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: User bob is not allowed to modify book",
        ));

    // Admins may read but not replace.
    env.cmd("root")
        .args(["--admin", "import", &id, template.to_str().unwrap()])
        .assert()
        .failure()
        .code(1);
    env.cmd("root")
        .args(["--admin", "export", &id, "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Harbour\""));

    assert_eq!(env.run("ana", &["export", "voyage", "--stdout"]), before);
}

#[test]
fn test_invalid_template_is_rejected() {
    let env = Env::new();
    env.new_book("ana", "Voyage");
    env.cmd("ana")
        .args(["import", "voyage", "-"])
        .write_stdin(r#"{ "book": { "title": "T" }, "chapters": {} }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid template at `chapters`"));
}

#[test]
fn test_book_from_template_on_stdin() {
    let env = Env::new();
    env.cmd("cy")
        .args(["book", "from-template", "-"])
        .write_stdin(
            r#"{ "book": { "title": "Fresh" },
                 "chapters": [ { "title": "One" }, { "title": "Two" } ],
                 "themes": [ { "name": "Hope" } ],
                 "gridCells": [ { "chapterIndex": 1, "themeIndex": 0 },
                                { "chapterIndex": 7, "themeIndex": 0 } ] }"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Created book Fresh ("))
        .stdout(predicate::str::contains("Skipped 1 grid cells"));

    let outline = env.run("cy", &["outline", "fresh"]);
    assert!(outline.contains("1. One"));
    assert!(outline.contains("2. Two"));
}

#[test]
fn test_missing_book_reference() {
    let env = Env::new();
    env.cmd("ana")
        .args(["outline", "nowhere"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no book matches 'nowhere'"));
}

#[test]
fn test_rank_commands() {
    let env = Env::new();
    env.cmd("ana")
        .args(["rank", "between"])
        .assert()
        .success()
        .stdout("U\n");
    env.cmd("ana")
        .args(["rank", "between", "--prev", "U"])
        .assert()
        .success()
        .stdout("g\n");
    env.cmd("ana")
        .args(["rank", "between", "--prev", "m", "--next", "a"])
        .assert()
        .success()
        .stdout("a0\n");
    env.cmd("ana")
        .args(["rank", "spread", "3"])
        .assert()
        .success()
        .stdout("B\nT\nf\n");
    env.cmd("ana")
        .args(["rank", "between", "--prev", "a0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a well-formed rank"));
}

#[test]
fn test_config_show_reflects_env_and_flags() {
    let env = Env::new();
    let out = env.run("ana", &["config", "show"]);
    assert!(out.contains("user = ana"));
    assert!(out.contains("rank_warn_length = 12"));

    let out = env.run("ana", &["--user", "bob", "config", "show"]);
    assert!(out.contains("user = bob"));
}
