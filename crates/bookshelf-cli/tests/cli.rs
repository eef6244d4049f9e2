//! Integration tests for the bookshelf CLI.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct TestEnv {
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("data").join("books.db");
        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("bookshelf-cli").expect("binary exists");
        cmd.env_remove("BOOKSHELF_TABLE_NAME")
            .env_remove("RUST_LOG")
            .arg("--db")
            .arg(&self.db_path);
        cmd
    }

    fn add(&self, isbn: &str, title: &str) -> assert_cmd::assert::Assert {
        self.cli()
            .args(["add", "--isbn", isbn, "--title", title, "--author", "B", "--year", "2020"])
            .assert()
    }
}

#[test]
fn init_creates_the_database() {
    let env = TestEnv::new();
    env.cli()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Table 'books' ready"));
    assert!(env.db_path.exists());
}

#[test]
fn add_get_remove_round_trip() {
    let env = TestEnv::new();

    env.add("111", "A")
        .success()
        .stdout(predicate::str::contains("\"isbn\": \"111\""));

    env.cli()
        .args(["get", "111"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"publishYear\": 2020"));

    env.add("111", "Again")
        .failure()
        .stderr(predicate::str::contains("already stored"));

    env.cli()
        .args(["remove", "111"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed book 111"));

    env.cli()
        .args(["get", "111"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BookNotFound"));
}

#[test]
fn list_prints_lines_or_json() {
    let env = TestEnv::new();
    env.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No books stored."));

    env.add("1", "One").success();
    env.add("2", "Two").success();

    env.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tOne\tB\t2020"))
        .stdout(predicate::str::contains("2\tTwo\tB\t2020"));

    let output = env.cli().args(["list", "--json"]).output().expect("run list");
    assert!(output.status.success());
    let books: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(books.as_array().map(Vec::len), Some(2));
}

#[test]
fn table_name_can_come_from_the_environment() {
    let env = TestEnv::new();
    env.cli()
        .env("BOOKSHELF_TABLE_NAME", "library")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Table 'library' ready"));

    env.cli()
        .args(["--table", "not valid", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open book table"));
}

#[test]
fn removing_an_unknown_book_succeeds() {
    let env = TestEnv::new();
    env.cli().args(["remove", "missing"]).assert().success();
}

#[test]
fn openapi_document_reflects_mode() {
    let env = TestEnv::new();
    env.cli()
        .arg("openapi")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"openapi\": \"3.0.1\""))
        .stdout(predicate::str::contains("\"post\""));

    env.cli()
        .args(["openapi", "--read-only", "--server-url", "https://books.example"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://books.example"))
        .stdout(predicate::str::contains("\"post\"").not())
        .stdout(predicate::str::contains("\"delete\"").not());
}
