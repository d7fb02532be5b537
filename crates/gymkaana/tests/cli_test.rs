//! Integration tests for the `gymkaana` CLI binary.
//!
//! Argument parsing, help output, and local commands run without a
//! backend; check-in commands talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `gymkaana` binary with env isolation.
///
/// Clears all `GYMKAANA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn gymkaana_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gymkaana");
    cmd.env("HOME", "/tmp/gymkaana-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gymkaana-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("GYMKAANA_PROFILE")
        .env_remove("GYMKAANA_API_URL")
        .env_remove("GYMKAANA_TOKEN")
        .env_remove("GYMKAANA_OUTPUT")
        .env_remove("GYMKAANA_INSECURE")
        .env_remove("GYMKAANA_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut cmd = gymkaana_cmd();
    cmd.args(["--api-url", &server.uri(), "--token", "owner-token"])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn booking_json() -> serde_json::Value {
    json!({
        "id": "bk_9f2",
        "memberName": "Asha Verma",
        "planName": "Monthly Unlimited",
        "status": "Active",
        "gymName": "Iron Temple"
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gymkaana_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gymkaana_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("check-in")
            .and(predicate::str::contains("lookup"))
            .and(predicate::str::contains("accept"))
            .and(predicate::str::contains("reject"))
            .and(predicate::str::contains("scan")),
    );
}

#[test]
fn test_version_flag() {
    gymkaana_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gymkaana"));
}

#[test]
fn test_reject_requires_reason() {
    let output = gymkaana_cmd().args(["reject", "abc123"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--reason"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    gymkaana_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gymkaana"));
}

#[test]
fn test_completions_invalid_shell() {
    gymkaana_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure();
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn test_reasons_plain_lists_codes() {
    gymkaana_cmd()
        .args(["reasons", "--output", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("booking-expired")
                .and(predicate::str::contains("wrong-gym"))
                .and(predicate::str::contains("other")),
        );
}

#[test]
fn test_reasons_json_marks_note_requirement() {
    let output = gymkaana_cmd()
        .args(["reasons", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let reasons: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let other = reasons
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["code"] == "other")
        .unwrap();
    assert_eq!(other["requires_note"], true);
}

#[test]
fn test_config_show_without_file() {
    gymkaana_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_use_unknown_profile() {
    let output = gymkaana_cmd()
        .args(["config", "use", "front-desk"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("front-desk"));
}

/// Like [`gymkaana_cmd`] but reading `config.toml` from under `home`.
#[cfg(target_os = "linux")]
fn cmd_with_config(
    home: &std::path::Path,
    contents: &str,
) -> (assert_cmd::Command, std::path::PathBuf) {
    let dir = home.join("gymkaana");
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("config.toml");
    std::fs::write(&file, contents).unwrap();

    let mut cmd = gymkaana_cmd();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home);
    (cmd, file)
}

#[cfg(target_os = "linux")]
#[test]
fn test_malformed_config_is_not_treated_as_missing() {
    let home = tempfile::tempdir().unwrap();
    let broken = "default_profile = [\n";
    let (mut cmd, _) = cmd_with_config(home.path(), broken);

    let output = cmd.args(["lookup", "abc123"]).output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        !text.contains("Configuration file not found"),
        "Expected a parse error, got:\n{text}"
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_malformed_config_is_left_untouched() {
    let home = tempfile::tempdir().unwrap();
    let broken = "default_profile = [\n";
    let (mut cmd, file) = cmd_with_config(home.path(), broken);

    let output = cmd.args(["config", "use", "default"]).output().unwrap();
    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&file).unwrap(), broken);
}

#[cfg(target_os = "linux")]
#[test]
fn test_env_selects_default_profile() {
    let home = tempfile::tempdir().unwrap();
    let (mut cmd, _) = cmd_with_config(
        home.path(),
        r#"
default_profile = "default"

[profiles.default]
api_url = "https://api.gymkaana.com"

[profiles.front-desk]
api_url = "https://api.gymkaana.com"
"#,
    );

    cmd.env("GYMKAANA_DEFAULT_PROFILE", "front-desk")
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("front-desk *"))
        .stdout(predicate::str::contains("default *").not());
}

// ── Error paths without a backend ───────────────────────────────────

#[test]
fn test_lookup_without_config() {
    let output = gymkaana_cmd().args(["lookup", "abc123"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("config init"),
        "Expected setup hint in output:\n{text}"
    );
}

#[test]
fn test_zero_timeout_rejected() {
    let output = gymkaana_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "--timeout",
            "0",
            "lookup",
            "abc123",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_reject_other_without_note() {
    let output = gymkaana_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "reject",
            "abc123",
            "--reason",
            "other",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--note"));
}

#[test]
fn test_scan_needs_terminal() {
    let output = gymkaana_cmd()
        .args(["--api-url", "http://127.0.0.1:9", "--token", "t", "scan"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("interactive terminal"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_prints_booking() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .and(header("Authorization", "Bearer owner-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["lookup", "  abc123 "]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Asha Verma"));
    assert!(stdout.contains("Monthly Unlimited"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_scanned_strips_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["lookup", "--scanned", "GYMKAANA-abc123", "-o", "json"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["id"], "bk_9f2");
    assert_eq!(record["member_name"], "Asha Verma");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_not_found_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = run_against(&server, &["lookup", "nope"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Invalid or Expired Booking ID"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_unauthorized_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad token" })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["lookup", "abc123"]).await;
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_accept_with_yes_confirms() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/owner/checkins/bk_9f2/confirm"))
        .and(body_json(json!({ "decision": "accept", "reason": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["--yes", "accept", "abc123", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["booking_id"], "bk_9f2");
    assert_eq!(outcome["decision"], "accept");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_accept_without_yes_needs_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["accept", "abc123"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reject_sends_reason_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/owner/checkins/bk_9f2/confirm"))
        .and(body_json(
            json!({ "decision": "reject", "reason": "Plan does not cover this visit" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["-y", "reject", "abc123", "--reason", "plan-not-valid"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Asha Verma"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reject_other_sends_note() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/owner/checkins/bk_9f2/confirm"))
        .and(body_json(
            json!({ "decision": "reject", "reason": "Came with a guest" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &[
            "-y",
            "reject",
            "abc123",
            "-r",
            "other",
            "-n",
            "  Came with a guest  ",
            "-o",
            "json",
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["decision"], "reject");
    assert_eq!(outcome["reason"], "Came with a guest");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_declined_confirm_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/checkins/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/owner/checkins/bk_9f2/confirm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Already checked in" })),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["-y", "accept", "abc123"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Already checked in"));
}
