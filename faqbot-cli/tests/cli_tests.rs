//! Runs the `faqbot` binary and checks startup failures exit with status 1.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, run from an empty directory so no `.env` file is picked up.
fn faqbot(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("faqbot").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("FAQBOT_DOCUMENT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_the_document_flag() {
    let dir = TempDir::new().unwrap();
    faqbot(&dir).arg("--help").assert().success().stdout(predicate::str::contains("--document"));
}

#[test]
fn missing_api_key_exits_with_status_1() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("faq.txt"), "Q: Hours?\nA: 9-5.").unwrap();

    faqbot(&dir)
        .args(["--document", "faq.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn blank_api_key_exits_with_status_1() {
    let dir = TempDir::new().unwrap();

    faqbot(&dir)
        .env("OPENAI_API_KEY", "   ")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn blank_document_exits_with_status_1() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("blank.txt"), "\n   \n").unwrap();

    faqbot(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .args(["--document", "blank.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load document 'blank.txt': file is empty"));
}

#[test]
fn missing_document_exits_with_status_1() {
    let dir = TempDir::new().unwrap();

    faqbot(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .args(["--document", "absent.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load document 'absent.txt'"));
}
