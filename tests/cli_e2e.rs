use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn jsondb(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("jsondb").unwrap();
    cmd.env("JSONDB_HOME", home)
        .env_remove("JSONDB_LOG")
        .env_remove("JSONDB_SUPPRESS_WARNINGS");
    cmd
}

fn init(home: &Path, name: &str) {
    jsondb(home).args(["init", name]).assert().success();
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    jsondb(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("jsondb 0.3.0"));
}

#[test]
fn init_creates_and_registers() {
    let home = tempfile::tempdir().unwrap();
    jsondb(home.path())
        .args(["init", "books"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Initialized database books"));

    assert!(home.path().join("books.jsondb").exists());
    jsondb(home.path())
        .arg("dbs")
        .assert()
        .success()
        .stdout(predicate::str::contains("books.jsondb"));

    jsondb(home.path())
        .args(["init", "books"])
        .assert()
        .code(2);
}

#[test]
fn set_query_format_pipeline() {
    let home = tempfile::tempdir().unwrap();
    init(home.path(), "books");

    jsondb(home.path())
        .args(["set", "books", "a", "-t", "x"])
        .assert()
        .success()
        .stdout("0\n")
        .stderr(predicate::str::contains("Entry 0 added"));
    jsondb(home.path())
        .args(["set", "books", "b"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["set", "books", "c", "-t", "x", "-a", "year:1965"])
        .assert()
        .success();

    jsondb(home.path())
        .args(["query", "books", "-f", "x"])
        .assert()
        .success()
        .stdout("0,2\n");

    jsondb(home.path())
        .args(["format", "books", "-i", "0"])
        .assert()
        .success()
        .stdout("[000] \"a\" (x) ()\n");

    // ids piped on stdin
    jsondb(home.path())
        .args(["format", "books", "-f", "%id()=%data()"])
        .write_stdin("0,2\n")
        .assert()
        .success()
        .stdout("0=a\n2=c\n");
}

#[test]
fn format_errors() {
    let home = tempfile::tempdir().unwrap();
    init(home.path(), "books");
    jsondb(home.path())
        .args(["set", "books", "a"])
        .assert()
        .success();

    jsondb(home.path())
        .args(["format", "books", "-i", "0", "-f", "%nope()"])
        .assert()
        .code(11);
    jsondb(home.path())
        .args(["format", "books", "-i", "5"])
        .assert()
        .code(9);
    jsondb(home.path())
        .args(["format", "books", "-i", "x"])
        .assert()
        .code(8)
        .stderr(predicate::str::contains("Index x is not a valid integer"));
}

#[test]
fn enforcement_rejects_unregistered_tags() {
    let home = tempfile::tempdir().unwrap();
    init(home.path(), "books");

    jsondb(home.path())
        .args(["modify", "books", "-t", "x", "--enforce-tags"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["set", "books", "ok", "-t", "x"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["set", "books", "bad", "-t", "x", "-t", "y"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("y"));

    jsondb(home.path())
        .args(["info", "books", "-s", "size"])
        .assert()
        .success()
        .stdout("1\n");
    jsondb(home.path())
        .args(["info", "books", "-s", "enforce_tags"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn id_edit_unset() {
    let home = tempfile::tempdir().unwrap();
    init(home.path(), "books");
    for data in ["Red apple", "green apple", "Pear"] {
        jsondb(home.path())
            .args(["set", "books", data])
            .assert()
            .success();
    }

    jsondb(home.path())
        .args(["id", "books", "apple", "-c", "-i"])
        .assert()
        .success()
        .stdout("0,1\n");
    jsondb(home.path())
        .args(["id", "books", "banana"])
        .assert()
        .success()
        .stdout("");

    jsondb(home.path())
        .args(["edit", "books", "2", "-d", "Plum", "-t", "fruit"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["format", "books", "-i", "2", "-f", "%data() %tags(\",\")"])
        .assert()
        .success()
        .stdout("Plum fruit\n");

    jsondb(home.path())
        .args(["unset", "books", "0"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["unset", "books", "0"])
        .assert()
        .code(9);
    jsondb(home.path())
        .args(["info", "books", "-s", "size"])
        .assert()
        .stdout("2\n");
}

#[test]
fn registry_add_and_remove() {
    let home = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    jsondb(home.path())
        .args(["init", "notes", "-p"])
        .arg(elsewhere.path())
        .assert()
        .success();
    assert!(elsewhere.path().join("notes.jsondb").exists());

    jsondb(home.path())
        .args(["rm-db", "notes"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["info", "notes"])
        .assert()
        .code(2);

    jsondb(home.path())
        .arg("add-db")
        .arg(elsewhere.path().join("notes.jsondb"))
        .assert()
        .success();
    jsondb(home.path())
        .args(["info", "notes", "-s", "size"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn shell_runs_commands_until_exit() {
    let home = tempfile::tempdir().unwrap();
    init(home.path(), "books");
    jsondb(home.path())
        .args(["shell", "books"])
        .write_stdin("set \"two words\" -t a\nunset 99\nquery -f a\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0\n"))
        .stderr(predicate::str::contains("Record 99 does not exist"));
}

#[test]
fn browse_reads_from_stdin() {
    let home = tempfile::tempdir().unwrap();
    init(home.path(), "books");
    jsondb(home.path())
        .args(["set", "books", "Dune"])
        .assert()
        .success();
    jsondb(home.path())
        .args(["browse", "books", "--no-confirmation-prompt"])
        .write_stdin("0\nd\ne\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry 0 deleted"));
    jsondb(home.path())
        .args(["info", "books", "-s", "size"])
        .assert()
        .stdout("0\n");
}
