//! Invokes the `certdeck` binary against the parser's certificate fixtures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../certdeck-parse/tests/fixtures")
        .join(name)
}

/// A binary invocation with its config isolated in `dir`.
fn certdeck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("certdeck").unwrap();
    cmd.env("CERTDECK_CONFIG", dir.path().join("config.toml"))
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn inspect_prints_json_record() {
    let dir = TempDir::new().unwrap();
    certdeck(&dir)
        .args(["inspect", "--output", "json"])
        .arg(fixture("leaf.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""commonName": "api.example.com""#))
        .stdout(predicate::str::contains(r#""serialNumber": "00:80:A1:B2""#))
        .stdout(predicate::str::contains(r#""source": "leaf.pem""#));
}

#[test]
fn inspect_pretty_shows_fields() {
    let dir = TempDir::new().unwrap();
    certdeck(&dir)
        .arg("inspect")
        .arg(fixture("san_only.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Certificate: san-only.example.net"))
        .stdout(predicate::str::contains("Subject: O=Example Corp, OU=Edge"))
        .stdout(predicate::str::contains("EXPIRED"));
}

#[test]
fn inspect_rejects_private_key() {
    let dir = TempDir::new().unwrap();
    certdeck(&dir)
        .arg("inspect")
        .arg(fixture("private_key.pem"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("private key detected"))
        .stderr(predicate::str::contains("1 of 1 files could not be parsed"));
}

#[test]
fn inspect_requires_a_file() {
    let dir = TempDir::new().unwrap();
    certdeck(&dir).arg("inspect").assert().failure();
}

#[test]
fn scan_reports_duplicates_and_failures() {
    let dir = TempDir::new().unwrap();
    let certs = dir.path().join("certs");
    std::fs::create_dir(&certs).unwrap();
    std::fs::copy(fixture("chain.pem"), certs.join("chain.pem")).unwrap();
    std::fs::copy(fixture("leaf.pem"), certs.join("leaf.pem")).unwrap();
    std::fs::copy(fixture("request.csr"), certs.join("request.pem")).unwrap();

    certdeck(&dir)
        .args(["scan", "--output", "json"])
        .arg(&certs)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total": 2"#))
        .stdout(predicate::str::contains(r#""duplicates": 1"#))
        .stdout(predicate::str::contains("certificate signing request detected"));
}

#[test]
fn scan_expiring_only_csv() {
    let dir = TempDir::new().unwrap();
    let certs = dir.path().join("certs");
    std::fs::create_dir(&certs).unwrap();
    std::fs::copy(fixture("nameless.pem"), certs.join("nameless.pem")).unwrap();
    std::fs::copy(fixture("ca.pem"), certs.join("ca.pem")).unwrap();

    certdeck(&dir)
        .args(["scan", "--expiring-only", "--output", "csv"])
        .arg(&certs)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("common_name,status,"))
        .stdout(predicate::str::contains("Unknown,EXPIRED,2024-01-01 00:00"))
        .stdout(predicate::str::contains("Example Root CA,VALID").not());
}

#[test]
fn config_set_then_show() {
    let dir = TempDir::new().unwrap();
    certdeck(&dir)
        .args(["config", "set", "soon_window_days", "60"])
        .assert()
        .success();

    certdeck(&dir)
        .args(["config", "show", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""soon_window_days": 60"#));

    certdeck(&dir)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn config_path_honours_override() {
    let dir = TempDir::new().unwrap();
    certdeck(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
