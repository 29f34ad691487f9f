#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

/// Nothing listens on the discard port, so every request fails fast.
const DEAD_API: &str = "http://127.0.0.1:9";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("sitegauge-core")
        .join("tests")
        .join("fixtures")
}

fn sitegauge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sitegauge").expect("binary should be built");
    cmd.env_remove("RUST_LOG")
        .env_remove("SITEGAUGE_API_URL")
        .env_remove("SITEGAUGE_CACHE_DIR")
        .env_remove("SITEGAUGE_TIMEOUT_SECS");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

#[test]
fn normalize_emits_canonical_json() {
    let output = sitegauge_cmd()
        .arg("normalize")
        .arg(fixtures_dir().join("embedded_analysis.json"))
        .args(["--now", "2026-10-01T12:00:00Z"])
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["wind"]["resource"]["wind_speed"], 7.2);
    assert_eq!(parsed["wind"]["resource"]["air_density"], 1.18);
    assert_eq!(parsed["solar"]["resource"]["grade"], "A");
    assert_eq!(parsed["suitability"]["rating"], "OPTIMAL");
    assert_eq!(parsed["timestamp"], "2026-10-01T12:00:00Z");
    assert!(parsed["wind"].get("profile").is_some());
}

#[test]
fn normalize_reads_stdin() {
    let output = sitegauge_cmd()
        .args(["normalize", "-", "--now", "t0"])
        .write_stdin(r#"{"wind": {}, "water": {"composite_risk_score": 70}}"#)
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["wind"]["resource"]["air_density"], 1.225);
    assert_eq!(parsed["water"]["interpretation"], "Good water availability");
    assert_eq!(parsed["suitability"]["overall_score"], 21.0);
}

#[test]
fn normalize_text_renders_tabs() {
    sitegauge_cmd()
        .arg("normalize")
        .arg(fixtures_dir().join("embedded_analysis.json"))
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("== Wind =="))
        .stdout(predicate::str::contains("== Hydrology =="))
        .stdout(predicate::str::contains("Chakan 400kV Substation"));
}

#[test]
fn normalize_writes_out_file() {
    let tmp = NamedTempFile::new().expect("create temp file");

    sitegauge_cmd()
        .arg("normalize")
        .arg(fixtures_dir().join("api_analysis.json"))
        .arg("--out")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(tmp.path()).expect("read output");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(parsed["suitability"]["rating"], "VIABLE");
}

#[test]
fn malformed_json_fails() {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"{\"wind\": ").expect("write");
    tmp.flush().expect("flush");

    sitegauge_cmd()
        .arg("normalize")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn missing_file_fails() {
    sitegauge_cmd()
        .args(["normalize", "/nonexistent/analysis.json"])
        .assert()
        .failure();
}

#[test]
fn catalog_lists_sites() {
    sitegauge_cmd()
        .arg("catalog")
        .arg("--catalog")
        .arg(fixtures_dir().join("catalog.geojson"))
        .assert()
        .success()
        .stdout(predicate::str::contains("pune-dc-1"))
        .stdout(predicate::str::contains("mumbai-edge-andheri"))
        .stdout(predicate::str::contains("chennai-hyperscale\tChennai Hyperscale\tChennai"));
}

#[test]
fn embedded_site_survives_weather_outage() {
    let cache = TempDir::new().expect("create cache dir");
    let output = sitegauge_cmd()
        .args(["site", "pune-dc-1", "--catalog"])
        .arg(fixtures_dir().join("catalog.geojson"))
        .args(["--api-url", DEAD_API, "--timeout", "5", "--cache-dir"])
        .arg(cache.path())
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["source"]["kind"], "embedded");
    assert_eq!(parsed["source"]["weather_fallback"], true);
    assert_eq!(parsed["site"]["id"], "pune-dc-1");
    assert_eq!(parsed["live"]["air_density_120m"], 1.225);
    assert_eq!(parsed["analysis"]["wind"]["resource"]["power_density"], 450.0);
}

#[test]
fn site_without_analysis_fails_when_api_is_down() {
    sitegauge_cmd()
        .args(["site", "chennai-hyperscale", "--no-cache", "--catalog"])
        .arg(fixtures_dir().join("catalog.geojson"))
        .args(["--api-url", DEAD_API, "--timeout", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("analysis unavailable"));
}

#[test]
fn unknown_site_fails() {
    sitegauge_cmd()
        .args(["site", "delhi-dc", "--no-cache", "--catalog"])
        .arg(fixtures_dir().join("catalog.geojson"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn point_snaps_to_catalog_site() {
    let output = sitegauge_cmd()
        .args(["point", "--lat", "18.5209", "--lon", "73.8561", "--no-cache", "--catalog"])
        .arg(fixtures_dir().join("catalog.geojson"))
        .args(["--api-url", DEAD_API, "--timeout", "5"])
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["site"]["id"], "pune-dc-1");
    assert_eq!(parsed["source"]["kind"], "embedded");
}
