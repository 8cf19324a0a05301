mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use support::temp_db::TempDb;
use tempfile::TempDir;
use tradetape::domain::TradeRecord;
use tradetape::port::TradeSink;

fn tradetape() -> Command {
    Command::cargo_bin("tradetape").expect("binary built")
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tradetape.toml");
    fs::write(&path, "[feed]\nsymbol = \"ethusdt\"\n").unwrap();

    tradetape()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("ethusdt@aggTrade"));
}

#[test]
fn config_validate_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tradetape.toml");
    fs::write(&path, "[ingest]\nflush_threshold = 0\n").unwrap();

    tradetape()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("flush_threshold"));
}

#[test]
fn config_validate_requires_existing_file() {
    let dir = TempDir::new().unwrap();
    tradetape()
        .args(["config", "validate", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn latest_on_missing_database_fails() {
    let dir = TempDir::new().unwrap();
    tradetape()
        .current_dir(dir.path())
        .args(["latest", "--database", "nope.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("database not found"));
}

#[test]
fn latest_on_empty_table_prints_null() {
    let db = TempDb::create();
    tradetape()
        .args(["latest", "--json", "--database", db.path()])
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn latest_prints_time_and_price() {
    let db = TempDb::create();
    db.writer()
        .commit(&[
            TradeRecord::new(1, 1_700_000_000_050, 37_000.5, 0.1),
            TradeRecord::new(2, 1_700_000_000_000, 36_999.0, 0.1),
        ])
        .unwrap();

    tradetape()
        .args(["latest", "--json", "--database", db.path()])
        .assert()
        .success()
        .stdout("{\"trade_time\":1700000000050,\"price\":37000.5}\n");

    tradetape()
        .args(["latest", "--database", db.path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2023-11-14 22:13:20.050 UTC"))
        .stdout(predicate::str::contains("37000.5"));
}

#[test]
fn latest_reads_database_from_config() {
    let db = TempDb::create();
    db.writer()
        .commit(&[TradeRecord::new(5, 1_000, 42.0, 1.0)])
        .unwrap();
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tradetape.toml");
    fs::write(&config, format!("database = {:?}\n", db.path())).unwrap();

    tradetape()
        .args(["latest", "--json", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout("{\"trade_time\":1000,\"price\":42.0}\n");
}

#[test]
fn run_rejects_zero_threshold_override() {
    let dir = TempDir::new().unwrap();
    tradetape()
        .current_dir(dir.path())
        .args(["run", "--flush-threshold", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("flush_threshold"));
}

#[test]
fn run_exits_on_unusable_database() {
    let dir = TempDir::new().unwrap();
    tradetape()
        .current_dir(dir.path())
        .args(["run", "--database"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("storage initialization failed"));
}
