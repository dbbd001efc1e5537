//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_pengayoman-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("PENGAYOMAN_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed non-JSON ({e}): {stdout}"))
}

/// Point the prayer API at a closed local port so fetches fail fast.
fn offline(home: &Path) {
    let (code, _, stderr) = run_cli(home, &["config", "set", "prayer_api.base_url", "http://127.0.0.1:9"]);
    assert_eq!(code, 0, "{stderr}");
    let (code, _, stderr) = run_cli(home, &["config", "set", "prayer_api.timeout_secs", "2"]);
    assert_eq!(code, 0, "{stderr}");
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "reward.duration_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "30");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "reward.duration_minutes", "5"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "reward.duration_minutes"]);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "{stderr}");
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let json = run_json(home.path(), &["config", "list"]);
    assert!(json["prayer_api"]["base_url"].is_string());
    assert_eq!(json["ads"]["reload_delay_ms"], 1000);
}

#[test]
fn test_consent_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["consent", "status"]);
    assert_eq!(status["status"], "not_required");
    assert_eq!(status["canRequestAds"], true);
    assert_eq!(status["version"], "1.0");

    let granted = run_json(home.path(), &["consent", "grant"]);
    assert_eq!(granted["status"], "obtained");

    let status = run_json(home.path(), &["consent", "status"]);
    assert_eq!(status["status"], "obtained");

    let revoked = run_json(home.path(), &["consent", "revoke"]);
    assert_eq!(revoked["status"], "required");
    assert_eq!(revoked["canRequestAds"], true);

    let (code, _, _) = run_cli(home.path(), &["consent", "reset"]);
    assert_eq!(code, 0);
    let status = run_json(home.path(), &["consent", "status"]);
    assert_eq!(status["status"], "not_required");
}

#[test]
fn test_reward_grant_and_clear() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["reward", "status"]);
    assert_eq!(status["ad_free"], false);
    assert_eq!(status["remaining"], "");

    let granted = run_json(home.path(), &["reward", "grant"]);
    assert_eq!(granted["ad_free"], true);
    let remaining = granted["remaining"].as_str().unwrap();
    assert!(remaining == "30:00" || remaining == "29:59", "{remaining}");

    let status = run_json(home.path(), &["reward", "status"]);
    assert_eq!(status["ad_free"], true);

    let cleared = run_json(home.path(), &["reward", "clear"]);
    assert_eq!(cleared["ad_free"], false);
    assert_eq!(cleared["expires_at_ms"], 0);
}

#[test]
fn test_ads_status_follows_consent_and_reward() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["ads", "status"]);
    assert_eq!(status["show_banner"], true);
    assert_eq!(status["request_configuration"]["request_non_personalized_ads_only"], true);
    assert_eq!(status["unit_ids"]["banner"], "ca-app-pub-3940256099942544/6300978111");

    run_json(home.path(), &["consent", "grant"]);
    let status = run_json(home.path(), &["ads", "status"]);
    assert_eq!(status["request_configuration"]["request_non_personalized_ads_only"], false);

    run_json(home.path(), &["reward", "grant"]);
    let status = run_json(home.path(), &["ads", "status"]);
    assert_eq!(status["show_banner"], false);
}

#[test]
fn test_prayers_fall_back_when_offline() {
    let home = tempfile::tempdir().unwrap();
    offline(home.path());

    let list = run_json(home.path(), &["prayers", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 3);

    let hits = run_json(home.path(), &["prayers", "list", "--search", "tidur"]);
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Doa Sebelum Tidur");

    let one = run_json(home.path(), &["prayers", "show", "2"]);
    assert_eq!(one["name"], "Doa Sesudah Makan");

    let (code, _, stderr) = run_cli(home.path(), &["prayers", "show", "999"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("prayer not found"), "{stderr}");
}
