use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TICKET: &str = "\
COLRUYT LAAGSTE PRIJZEN
Kassabon 13/08/2025 19:24
A 52311 BANANEN CHIQUITA 0,842kg 1,99 1,68
A 10078 MELK HALFVOL 1L 2 1,09 2,18
\x0c\
C 9901 LEEGGOED BAK -1 3,60 -3,60
TOTAAL 3 ARTIKELEN 0,26
";

/// Temp workspace with a config file pointing the store inside it.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let contents = serde_json::json!({
        "store": { "root": dir.path().join("data") }
    });
    fs::write(&config, contents.to_string()).unwrap();
    (dir, config)
}

fn kassa(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kassa").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn write_ticket(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, TICKET).unwrap();
    path
}

#[test]
fn test_process_text_receipt_as_json() {
    let (dir, config) = workspace();
    let ticket = write_ticket(dir.path(), "kasticket_9551.txt");

    kassa(&config)
        .arg("process")
        .arg(&ticket)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"kasticket_9551\""))
        .stdout(predicate::str::contains("BANANEN CHIQUITA"))
        .stdout(predicate::str::contains("LEEGGOED BAK"))
        .stdout(predicate::str::contains("2025-08-13"));
}

#[test]
fn test_process_csv_has_one_row_per_item() {
    let (dir, config) = workspace();
    let ticket = write_ticket(dir.path(), "kasticket_9551.txt");

    let output = kassa(&config)
        .args(["process", "--format", "csv"])
        .arg(&ticket)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("date,kind,article_code"));
    assert!(rows[1].contains("true"));
}

#[test]
fn test_process_rejects_file_without_items() {
    let (dir, config) = workspace();
    let empty = dir.path().join("leeg.txt");
    fs::write(&empty, "Bedankt en tot ziens\n").unwrap();

    kassa(&config)
        .arg("process")
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no line items"));
}

#[test]
fn test_process_missing_file() {
    let (dir, config) = workspace();

    kassa(&config)
        .arg("process")
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_ingest_then_report() {
    let (dir, config) = workspace();
    let tickets = dir.path().join("tickets");
    fs::create_dir_all(&tickets).unwrap();
    write_ticket(&tickets, "kasticket_1.txt");
    write_ticket(&tickets, "kasticket_2.txt");
    let pattern = format!("{}/*.txt", tickets.display());

    kassa(&config)
        .args(["ingest", &pattern])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 uploaded, 0 skipped, 0 failed"));

    // Same files again: ids already stored
    kassa(&config)
        .args(["ingest", &pattern])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 uploaded, 2 skipped, 0 failed"));

    kassa(&config)
        .args(["report", "monthly", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"2025-08\""))
        .stdout(predicate::str::contains("\"item_count\": 6"));

    kassa(&config)
        .args(["report", "articles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MELK HALFVOL 1L"));

    kassa(&config)
        .args(["report", "article", "10078", "--code", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-08,1.09,2"));
}

#[test]
fn test_report_reads_seeded_store() {
    let (dir, config) = workspace();
    let receipt = dir.path().join("data").join("kastickets_raw").join("seeded");
    fs::create_dir_all(receipt.join("items")).unwrap();
    fs::write(
        receipt.join("receipt.json"),
        r#"{"datum":"2025-09-02","aantal_items":2,"totaal":20.0,"bron":"seeded.pdf"}"#,
    )
    .unwrap();
    fs::write(
        receipt.join("items").join("000000.json"),
        concat!(
            r#"{"datum":"2025-09-02","artikelnummer":"1","artikel":"KOFFIE","#,
            r#""aantal_of_gewicht":1,"prijs":12.0,"totaal":12.0,"korting":-1.5}"#,
        ),
    )
    .unwrap();
    fs::write(
        receipt.join("items").join("000001.json"),
        concat!(
            r#"{"datum":"2025-09-02","artikelnummer":"2","artikel":"THEE","#,
            r#""aantal_of_gewicht":"2","prijs":"4","totaal":"8"}"#,
        ),
    )
    .unwrap();
    fs::write(receipt.join("items").join("000002.json"), "{ broken").unwrap();

    kassa(&config)
        .args(["report", "monthly", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-09,2,20"))
        .stderr(predicate::str::contains("Skipped 1 unreadable records"));

    kassa(&config)
        .args(["report", "items", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KOFFIE"))
        .stdout(predicate::str::contains("THEE").not());
}

#[test]
fn test_config_set_and_get() {
    let (_dir, config) = workspace();

    kassa(&config)
        .args(["config", "set", "store.discount_convention", "magnitude"])
        .assert()
        .success();

    kassa(&config)
        .args(["config", "get", "store.discount_convention"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"magnitude\""));

    kassa(&config)
        .args(["config", "set", "store.discount_convention", "sideways"])
        .assert()
        .failure();
}

#[test]
fn test_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    kassa(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    kassa(&config).args(["config", "init"]).assert().success();
    assert!(config.is_file());

    kassa(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
