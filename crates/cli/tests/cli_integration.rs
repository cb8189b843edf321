//! CLI integration tests for the `optwatch` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and on-disk state. Every test runs against its own temp
//! project root so state directories never collide.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn optwatch(root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("optwatch");
    cmd.current_dir(root);
    cmd
}

/// Lenient config so gate tests exercise the tick rule in isolation.
fn write_lenient_config(root: &Path) {
    fs::write(
        root.join("optwatch.toml"),
        "[review]\nrequire_attestation = false\n",
    )
    .unwrap();
}

fn start_change(root: &Path, title: &str) -> String {
    let output = optwatch(root)
        .args(["change", "start", "--title", title, "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["change_id"].as_str().unwrap().to_string()
}

fn snapshot_json(label: &str, dot_bytes: u64) -> String {
    serde_json::json!({
        "schema": "optwatch.snapshot.v1",
        "label": label,
        "generated_at": "2026-08-25T00:00:00Z",
        "sizes": {".": {"resolved_path": "/proj", "bytes": dot_bytes}}
    })
    .to_string()
}

#[test]
fn help_exits_0_with_description() {
    let tmp = TempDir::new().unwrap();
    optwatch(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Evidence-based verification of optimization changes",
        ));
}

#[test]
fn init_creates_state_dir_config_and_logbook() {
    let tmp = TempDir::new().unwrap();
    optwatch(tmp.path()).arg("init").assert().success();

    assert!(tmp.path().join(".optwatch/snapshots").is_dir());
    assert!(tmp.path().join(".optwatch/changes").is_dir());
    assert!(tmp.path().join(".optwatch/config.json").is_file());
    assert!(tmp.path().join("OPTIMIZATION_LOG.md").is_file());

    // Re-running never clobbers operator edits.
    fs::write(tmp.path().join("OPTIMIZATION_LOG.md"), "edited\n").unwrap();
    fs::write(tmp.path().join(".optwatch/config.json"), "{}").unwrap();
    optwatch(tmp.path()).arg("init").assert().success();
    assert_eq!(
        fs::read_to_string(tmp.path().join("OPTIMIZATION_LOG.md")).unwrap(),
        "edited\n"
    );
    assert_eq!(
        fs::read_to_string(tmp.path().join(".optwatch/config.json")).unwrap(),
        "{}"
    );
}

#[test]
fn snapshot_prints_a_path_that_exists() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("data.bin"), vec![0u8; 64]).unwrap();

    let output = optwatch(tmp.path())
        .args(["snapshot", "--label", "before"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let path = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert!(path.contains("snapshots"));
    assert!(path.ends_with("_before.json"));
    assert!(Path::new(&path).is_file());
}

#[test]
fn snapshot_attach_requires_both_flags() {
    let tmp = TempDir::new().unwrap();
    optwatch(tmp.path())
        .args(["snapshot", "--change-id", "chg-x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--attach-as"));
}

#[test]
fn snapshot_attach_updates_the_change_record() {
    let tmp = TempDir::new().unwrap();
    let change_id = start_change(tmp.path(), "trim deps");

    optwatch(tmp.path())
        .args([
            "snapshot",
            "--label",
            "before",
            "--change-id",
            &change_id,
            "--attach-as",
            "before",
        ])
        .assert()
        .success();

    let record = fs::read_to_string(
        tmp.path()
            .join(format!(".optwatch/changes/{}.json", change_id)),
    )
    .unwrap();
    let record: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert!(record["snapshot_before"]
        .as_str()
        .unwrap()
        .ends_with("_before.json"));
}

#[test]
fn compare_reports_the_negative_size_delta() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.json"), snapshot_json("before", 1000)).unwrap();
    fs::write(tmp.path().join("b.json"), snapshot_json("after", 800)).unwrap();

    optwatch(tmp.path())
        .args(["compare", "a.json", "b.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Optimization Compare Report"))
        .stdout(predicate::str::contains("1000 -> 800 bytes (delta -200)"));
}

#[test]
fn compare_writes_requested_artifacts() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.json"), snapshot_json("before", 10)).unwrap();
    fs::write(tmp.path().join("b.json"), snapshot_json("after", 10)).unwrap();

    optwatch(tmp.path())
        .args([
            "compare", "a.json", "b.json", "--out", "report.md", "--json-out", "delta.json",
        ])
        .assert()
        .success();

    assert!(fs::read_to_string(tmp.path().join("report.md"))
        .unwrap()
        .contains("## Size deltas"));
    let delta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("delta.json")).unwrap()).unwrap();
    assert_eq!(delta["schema"], "optwatch.compare.v1");
    assert_eq!(delta["sizes"]["."]["delta_bytes"], 0);
}

#[test]
fn compare_with_non_object_snapshot_exits_2() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.json"), "[]").unwrap();
    fs::write(tmp.path().join("b.json"), snapshot_json("after", 1)).unwrap();

    optwatch(tmp.path())
        .args(["compare", "a.json", "b.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected JSON object"));
}

#[test]
fn change_start_and_list_round_trip() {
    let tmp = TempDir::new().unwrap();
    let change_id = start_change(tmp.path(), "Cache the build");
    assert!(change_id.starts_with("chg-"));
    assert!(change_id.ends_with("cache-the-build"));

    optwatch(tmp.path())
        .args(["change", "list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache the build"))
        .stdout(predicate::str::contains("\"status\": \"planned\""));

    // The logbook picked up the change block.
    let log = fs::read_to_string(tmp.path().join("OPTIMIZATION_LOG.md")).unwrap();
    assert!(log.contains(&change_id));
}

#[test]
fn monitor_start_without_snapshots_exits_2_and_writes_no_state() {
    let tmp = TempDir::new().unwrap();
    let change_id = start_change(tmp.path(), "t");

    optwatch(tmp.path())
        .args(["monitor", "start", "--change-id", &change_id])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no baseline snapshot"));
    assert!(!tmp.path().join(".optwatch/monitor.json").exists());
}

#[test]
fn monitor_tick_runs_once_per_day() {
    let tmp = TempDir::new().unwrap();
    let change_id = start_change(tmp.path(), "t");
    optwatch(tmp.path())
        .args(["snapshot", "--label", "before"])
        .assert()
        .success();
    optwatch(tmp.path())
        .args(["monitor", "start", "--change-id", &change_id, "--days", "2"])
        .assert()
        .success();

    optwatch(tmp.path())
        .args(["monitor", "tick"])
        .assert()
        .success()
        .stdout(predicate::str::contains("day 0"));
    optwatch(tmp.path())
        .args(["monitor", "tick"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
    optwatch(tmp.path())
        .args(["monitor", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2 ticks"));
}

#[test]
fn monitor_tick_without_a_monitor_exits_2() {
    let tmp = TempDir::new().unwrap();
    optwatch(tmp.path())
        .args(["monitor", "tick"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no active monitor"));
}

#[test]
fn monitor_status_reports_inactive() {
    let tmp = TempDir::new().unwrap();
    optwatch(tmp.path())
        .args(["monitor", "status", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"active\": false"));
}

#[test]
fn verify_reports_the_tick_shortfall() {
    let tmp = TempDir::new().unwrap();
    write_lenient_config(tmp.path());
    let change_id = start_change(tmp.path(), "t");

    optwatch(tmp.path())
        .args(["change", "verify", "--change-id", &change_id])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("BLOCKED"))
        .stdout(predicate::str::contains(
            "insufficient monitor ticks: have 0 need 3",
        ));
}

#[test]
fn ok_on_pending_turns_tick_shortfall_into_success() {
    let tmp = TempDir::new().unwrap();
    write_lenient_config(tmp.path());
    let change_id = start_change(tmp.path(), "t");

    optwatch(tmp.path())
        .args([
            "change",
            "verify",
            "--change-id",
            &change_id,
            "--ok-on-pending",
        ])
        .assert()
        .success();

    // Pending never excuses a non-tick failure.
    optwatch(tmp.path())
        .args([
            "change",
            "verify",
            "--change-id",
            "chg-missing",
            "--ok-on-pending",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("change record not found"));
}

#[test]
fn verify_apply_marks_the_record_verified() {
    let tmp = TempDir::new().unwrap();
    write_lenient_config(tmp.path());
    let change_id = start_change(tmp.path(), "t");

    optwatch(tmp.path())
        .args([
            "change",
            "verify",
            "--change-id",
            &change_id,
            "--apply",
            "--min-monitor-days",
            "0",
            "--summary",
            "held steady",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("VERIFIED"));

    let record = fs::read_to_string(
        tmp.path()
            .join(format!(".optwatch/changes/{}.json", change_id)),
    )
    .unwrap();
    let record: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert_eq!(record["status"], "verified");
    assert_eq!(record["verified_summary"], "held steady");
}

#[test]
fn review_attest_writes_the_document_and_warns_on_off_policy_mode() {
    let tmp = TempDir::new().unwrap();
    let change_id = start_change(tmp.path(), "t");

    optwatch(tmp.path())
        .args([
            "review", "attest", "--change-id", &change_id, "--reviewer", "alex", "--model",
            "gpt-5", "--mode", "low", "--tool", "codex",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("not an allowed mode"));

    let att_path = tmp
        .path()
        .join(format!(".optwatch/attestations/review_{}.json", change_id));
    let att: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(att_path).unwrap()).unwrap();
    assert_eq!(att["schema"], "optwatch.attestation.v1");
    assert_eq!(att["reviewer"], "alex");
}

#[test]
fn unparsable_config_exits_2() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("optwatch.toml"), "not = [valid").unwrap();
    optwatch(tmp.path())
        .args(["snapshot", "--label", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("optwatch.toml"));
}

#[test]
fn json_mode_errors_are_valid_json_even_for_multiline_messages() {
    let tmp = TempDir::new().unwrap();
    // toml parse errors span multiple lines and contain quotes.
    fs::write(tmp.path().join("optwatch.toml"), "not = [valid").unwrap();
    let output = optwatch(tmp.path())
        .args(["snapshot", "--label", "x", "--output", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("optwatch.toml"));
}

#[test]
fn custom_state_dir_is_respected() {
    let tmp = TempDir::new().unwrap();
    optwatch(tmp.path())
        .args(["--dir", ".evidence", "init"])
        .assert()
        .success();
    assert!(tmp.path().join(".evidence/config.json").is_file());
    assert!(!tmp.path().join(".optwatch").exists());
}
