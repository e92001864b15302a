//! Integration tests for the camledger CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DIRECTORY: &str = r#"{
  "buildings": [
    {
      "id": 7,
      "name": "Harbour Mall",
      "total_leasable_area": 10000.0,
      "generator_fee": 30000000,
      "transformer_fee": 20000000
    },
    {
      "id": 8,
      "name": "Ridge Plaza",
      "total_leasable_area": 5000.0,
      "generator_fee": 50000000,
      "transformer_fee": 30000000
    }
  ],
  "units": [
    { "id": 1, "building_id": 7, "unit_number": "G-01", "unit_space": 4000.0 },
    { "id": 2, "building_id": 7, "unit_number": "G-02", "unit_space": 6000.0 },
    { "id": 3, "building_id": 8, "unit_number": "A-1", "unit_space": 1000.0 },
    { "id": 4, "building_id": 8, "unit_number": "A-2", "unit_space": 3000.0 }
  ],
  "leases": [
    { "unit_id": 1, "tenant_name": "Acme Stores" },
    { "unit_id": 3, "tenant_name": "Blue Cafe" },
    { "unit_id": 4, "tenant_name": "Gone Ltd", "active": false }
  ]
}"#;

fn camledger(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("camledger").unwrap();
    cmd.env("CAM_LEDGER_DATA_DIR", data_dir)
        .env_remove("CAM_LEDGER_SCOPE")
        .env_remove("RUST_LOG");
    cmd
}

/// A data directory with the fixture directory imported
fn ledger() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("export.json");
    fs::write(&export, DIRECTORY).unwrap();

    camledger(temp_dir.path()).arg("init").assert().success();
    camledger(temp_dir.path())
        .args(["directory", "import"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Buildings:     2"));

    temp_dir
}

fn allocate(data_dir: &Path, building: &str, period: &str, other: &str) -> assert_cmd::assert::Assert {
    camledger(data_dir)
        .args(["allocate", "--building", building, "--period", period, "--other-cam", other])
        .assert()
}

fn list_json(data_dir: &Path) -> Vec<Value> {
    let output = camledger(data_dir)
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice::<Vec<Value>>(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("camledger")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("allocate"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_init_writes_settings() {
    let temp_dir = TempDir::new().unwrap();
    camledger(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));

    assert!(temp_dir.path().join("config.json").exists());
    assert!(temp_dir.path().join("data").is_dir());

    camledger(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status transitions: Strict"));
}

#[test]
fn test_preview_does_not_persist() {
    let dir = ledger();

    camledger(dir.path())
        .args(["preview", "-b", "7", "-p", "2025-01", "-o", "150000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40.00%"))
        .stdout(predicate::str::contains("$650,000.00"))
        .stdout(predicate::str::contains("$390,000.00"))
        .stdout(predicate::str::contains("Acme Stores"));

    camledger(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No expense records found."));
}

#[test]
fn test_preview_json_with_unallocated_area() {
    let dir = ledger();

    let output = camledger(dir.path())
        .args(["preview", "-b", "8", "-p", "2025-03", "-o", "200000", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["unallocated_area"], 1000.0);
    assert_eq!(summary["tenants_cam"], 20_000_000);
    assert_eq!(summary["owner_cam"], 80_000_000);
    assert_eq!(summary["units"][1]["tenant_name"], "Vacant");
}

#[test]
fn test_allocate_then_duplicate_rejected() {
    let dir = ledger();

    allocate(dir.path(), "7", "2025-01-01..2025-01-31", "150000")
        .success()
        .stdout(predicate::str::contains("Owner share: $390,000.00"))
        .stdout(predicate::str::contains("PENDING"));

    allocate(dir.path(), "bld-7", "2025-01-01..2025-01-31", "1")
        .failure()
        .stderr(predicate::str::contains(
            "An allocation already exists for building bld-7 in period 2025-01-01..2025-01-31",
        ));

    let records = list_json(dir.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["total_amount"], 39_000_000);
    assert_eq!(records[0]["other_cam_costs"], 15_000_000);
}

#[test]
fn test_status_changes_follow_strict_policy() {
    let dir = ledger();
    allocate(dir.path(), "7", "2025-01", "150000").success();
    let id = list_json(dir.path())[0]["id"].as_str().unwrap().to_string();

    camledger(dir.path())
        .args(["status", &id, "paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING -> PAID"));

    camledger(dir.path())
        .args(["status", &id, "pending"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot change status from PAID to PENDING"));

    camledger(dir.path())
        .args(["list", "--status", "paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Harbour Mall"));
}

#[test]
fn test_delete_keeps_audit_trail() {
    let dir = ledger();
    allocate(dir.path(), "7", "2025-01", "150000").success();
    let id = list_json(dir.path())[0]["id"].as_str().unwrap().to_string();

    camledger(dir.path())
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted expense record"));

    assert!(list_json(dir.path()).is_empty());

    camledger(dir.path())
        .args(["audit", "--record", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE ExpenseRecord"))
        .stdout(predicate::str::contains("DELETE ExpenseRecord"));

    camledger(dir.path())
        .args(["show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expense record not found"));
}

#[test]
fn test_scope_restricts_buildings() {
    let dir = ledger();
    allocate(dir.path(), "8", "2025-01", "0").success();

    camledger(dir.path())
        .args(["--scope", "8", "preview", "-b", "7", "-p", "2025-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authorized for building bld-7"));

    camledger(dir.path())
        .args(["--scope", "7", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expense records found."));

    camledger(dir.path())
        .args(["--scope", "8", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ridge Plaza"));
}

#[test]
fn test_scoped_audit_limit_counts_visible_entries() {
    let dir = ledger();
    allocate(dir.path(), "8", "2025-01", "0").success();
    allocate(dir.path(), "7", "2025-01", "0").success();

    camledger(dir.path())
        .args(["--scope", "8", "audit", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE ExpenseRecord"))
        .stdout(predicate::str::contains("Ridge Plaza"))
        .stdout(predicate::str::contains("Harbour Mall").not());
}

#[test]
fn test_input_errors() {
    let dir = ledger();

    allocate(dir.path(), "99", "2025-01", "100")
        .failure()
        .stderr(predicate::str::contains("Building not found: bld-99"));

    allocate(dir.path(), "7", "2999-01", "100")
        .failure()
        .stderr(predicate::str::contains("period start is in the future"));

    allocate(dir.path(), "7", "2025-02-01..2025-01-01", "100")
        .failure()
        .stderr(predicate::str::contains("period end must be after period start"));

    camledger(dir.path())
        .args(["allocate", "-b", "7", "-p", "2025-01", "--other-cam=-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be negative"));

    assert!(list_json(dir.path()).is_empty());
}

#[test]
fn test_directory_show() {
    let dir = ledger();

    camledger(dir.path())
        .args(["directory", "show", "--units"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Harbour Mall"))
        .stdout(predicate::str::contains("Blue Cafe"))
        .stdout(predicate::str::contains("10000.00 sq ft"));
}
