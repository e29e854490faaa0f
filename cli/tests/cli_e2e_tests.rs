//! CLI end-to-end tests that run the binary against shared IR fixtures.
//! These complement `cli_tests.rs` with multi-input and import scenarios.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("xsd2").expect("binary should exist")
}

fn fixture(name: &str) -> String {
    format!("{FIXTURES_DIR}/{name}.ir.json")
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).expect("output file should exist");
    serde_json::from_str(&content).expect("output should be valid JSON")
}

fn find_type<'a>(ir: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    ir["types"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == name)
        .unwrap_or_else(|| panic!("type {name} should exist"))
}

// ── E2E: --all over a realistic input ───────────────────────────────────────

#[test]
fn test_e2e_all_flags() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture("order"))
        .arg("--all")
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let ir = read_json(&dir.path().join("order.ir.json"));

    let order = find_type(&ir, "PurchaseOrder");
    // Debugger marker stripped, root element name pinned.
    assert_eq!(order["annotations"].as_array().unwrap().len(), 2);
    assert_eq!(order["original_xml_name"], "purchaseOrder");
    assert_eq!(order["members"][0]["name"], "OrderDate");
    assert_eq!(order["members"][0]["declared_type"]["kind"], "nullable");
    assert_eq!(order["members"][0]["xml_data_type"], "date");
    assert_eq!(order["members"][2]["declared_type"]["kind"], "list");
    assert_eq!(order["members"][2]["declared_type"]["element"]["name"], "Item");

    // Mixed content got a text member.
    let item = find_type(&ir, "Item");
    assert_eq!(item["members"][1]["name"], "Text");
    assert_eq!(item["members"][1]["kind"], "text");

    // Referenced import kept, unreferenced import excluded.
    assert_eq!(find_type(&ir, "Address")["excluded"], false);
    assert_eq!(find_type(&ir, "Country")["excluded"], true);
}

// ── E2E: Combine ────────────────────────────────────────────────────────────

#[test]
fn test_e2e_combine_reports_conflict() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args([fixture("order"), fixture("invoice")])
        .args(["--combine", "all.json", "-n", "Billing"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("{urn:common}address"));

    let combined = read_json(&dir.path().join("all.json"));
    assert_eq!(combined["source"], "Billing");
    let names: Vec<&str> = combined["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["purchaseOrder", "item", "address", "country", "invoice"]);
    // First-seen definition wins.
    assert_eq!(find_type(&combined, "address")["members"].as_array().unwrap().len(), 1);
}

// ── E2E: Imports by XML identity ────────────────────────────────────────────

#[test]
fn test_e2e_import_identities() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("local.ir.json");
    let out_dir = dir.path().join("out");

    // Same address type, but not flagged as imported by the importer.
    let mut ir: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fixture("order")).unwrap()).unwrap();
    for decl in ir["types"].as_array_mut().unwrap() {
        decl["imported"] = serde_json::json!(false);
    }
    fs::write(&input, ir.to_string()).unwrap();

    cmd()
        .args([input.to_str().unwrap(), "--ein"])
        .arg("--import")
        .arg(fixture("common"))
        .args(["-o", out_dir.to_str().unwrap()])
        .assert()
        .success();

    let out = read_json(&out_dir.join("local.ir.json"));
    assert_eq!(find_type(&out, "address")["excluded"], true);
    assert_eq!(find_type(&out, "country")["excluded"], false);
}

#[test]
fn test_e2e_without_imports_nothing_excluded() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture("invoice"))
        .arg("--ei")
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let out = read_json(&dir.path().join("invoice.ir.json"));
    assert_eq!(find_type(&out, "address")["excluded"], false);
}
