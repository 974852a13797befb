//! CLI smoke tests: seed a corpus, index it, search it through the binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn docsearch() -> Command {
    Command::cargo_bin("docsearch").expect("binary builds")
}

#[test]
fn seed_index_search_roundtrip() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    let data = dir.path().join("data");

    docsearch()
        .args(["seed", "--docs"])
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("sample documents"));

    docsearch()
        .arg("--data-dir")
        .arg(&data)
        .args(["index", "--docs"])
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"indexed\""));

    docsearch()
        .arg("--data-dir")
        .arg(&data)
        .args(["search", "space shuttle launch", "--top-k", "2", "--docs"])
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("doc_000.txt"))
        .stdout(predicate::str::contains("overlap_ratio"));
}

#[test]
fn index_missing_docs_dir_fails() {
    let dir = tempdir().unwrap();

    docsearch()
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .args(["index", "--docs"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure();
}

#[test]
fn second_index_run_reuses_cache() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    let data = dir.path().join("data");

    docsearch().args(["seed", "--docs"]).arg(&docs).assert().success();

    docsearch()
        .arg("--data-dir")
        .arg(&data)
        .args(["index", "--docs"])
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reused\": 0"));

    docsearch()
        .arg("--data-dir")
        .arg(&data)
        .args(["index", "--docs"])
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"embedded\": 0"));
}
