//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "lucero-cli", "--"])
        .args(args)
        .env("LUCERO_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "profile.usual_bed_hour"]);
    assert_eq!(code, 0, "Config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key() {
    let (_, stderr, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_set() {
    let (stdout, _, code) = run_cli(&["config", "set", "policy.nap_length_minutes", "20"]);
    assert_eq!(code, 0, "Config set failed");
    assert!(stdout.contains("ok"));
}

#[test]
fn test_config_list() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "Config list failed");
    assert!(stdout.contains("profile"));
    assert!(stdout.contains("bandit"));
}

#[test]
fn test_debt_status() {
    let (_, _, code) = run_cli(&["debt", "status"]);
    assert_eq!(code, 0, "Debt status failed");
}

#[test]
fn test_debt_status_json() {
    let (stdout, _, code) = run_cli(&["debt", "status", "--json"]);
    assert_eq!(code, 0, "Debt status JSON failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert!(parsed.get("acute_debt_hours").is_some());
    assert!(parsed.get("severity").is_some());
}

#[test]
fn test_debt_series_json() {
    let (stdout, _, code) = run_cli(&["debt", "series", "--days", "3", "--json"]);
    assert_eq!(code, 0, "Debt series failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(3));
}

#[test]
fn test_debt_breakdown() {
    let (_, _, code) = run_cli(&["debt", "breakdown"]);
    assert_eq!(code, 0, "Debt breakdown failed");
}

#[test]
fn test_habits_show() {
    let (_, _, code) = run_cli(&["habits", "show"]);
    assert_eq!(code, 0, "Habits show failed");
}

#[test]
fn test_habits_show_json() {
    let (stdout, _, code) = run_cli(&["habits", "show", "--json"]);
    assert_eq!(code, 0, "Habits show JSON failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert!(parsed.get("regularity_index").is_some());
}

#[test]
fn test_habits_score() {
    let (stdout, _, code) = run_cli(&["habits", "score", "8.0", "--quality", "5"]);
    assert_eq!(code, 0, "Habits score failed");
    let score: f64 = stdout.trim().parse().expect("score not a number");
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn test_coach_suggest_json() {
    let (stdout, _, code) = run_cli(&["coach", "suggest", "--free-minutes", "45", "--json"]);
    assert_eq!(code, 0, "Coach suggest failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert!(parsed.get("kind").is_some());
    assert!(parsed.get("arm").is_some());
    assert!(parsed.get("context").is_some());
}

#[test]
fn test_coach_feedback_after_suggest() {
    let (_, _, code) = run_cli(&["coach", "suggest"]);
    assert_eq!(code, 0, "Coach suggest failed");
    let (stdout, _, code) = run_cli(&["coach", "feedback", "0.5"]);
    assert_eq!(code, 0, "Coach feedback failed");
    assert!(stdout.contains("recorded reward"));
}

#[test]
fn test_coach_stats() {
    let (_, _, code) = run_cli(&["coach", "stats"]);
    assert_eq!(code, 0, "Coach stats failed");
}

#[test]
fn test_sim_run_seeded_is_deterministic() {
    let first = run_cli(&["sim", "run", "--nights", "10", "--seed", "7", "--json"]);
    let second = run_cli(&["sim", "run", "--nights", "10", "--seed", "7", "--json"]);
    assert_eq!(first.2, 0, "Sim run failed");
    assert_eq!(first.0, second.0, "Seeded runs should match");
}

#[test]
fn test_sim_run_night_owl() {
    let (stdout, _, code) = run_cli(&[
        "sim", "run", "--archetype", "night-owl", "--nights", "7", "--seed", "1",
    ]);
    assert_eq!(code, 0, "Sim run failed");
    assert!(stdout.contains("night-owl"));
}

#[test]
fn test_sim_rejects_unknown_archetype() {
    let (_, stderr, code) = run_cli(&["sim", "run", "--archetype", "lark"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("lark"));
}

#[test]
fn test_sim_list() {
    let (stdout, _, code) = run_cli(&["sim", "list"]);
    assert_eq!(code, 0, "Sim list failed");
    assert!(stdout.contains("steady"));
    assert!(stdout.contains("shift-worker"));
}

#[test]
fn test_preset_list() {
    let (stdout, _, code) = run_cli(&["preset", "list"]);
    assert_eq!(code, 0, "Preset list failed");
    assert!(stdout.contains("early-bird"));
    assert!(stdout.contains("night-owl"));
}

#[test]
fn test_preset_show() {
    let (stdout, _, code) = run_cli(&["preset", "show", "early-bird"]);
    assert_eq!(code, 0, "Preset show failed");
    assert!(stdout.contains("Rationale"));
}

#[test]
fn test_preset_show_unknown() {
    let (_, stderr, code) = run_cli(&["preset", "show", "does-not-exist"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_log_add_list_remove() {
    let (stdout, _, code) = run_cli(&[
        "log",
        "add",
        "2026-01-10T23:00:00Z",
        "2026-01-11T07:00:00Z",
    ]);
    assert_eq!(code, 0, "Log add failed");
    assert!(stdout.contains("added"));
    let id = stdout
        .split_whitespace()
        .nth(1)
        .expect("no id in add output");

    let (stdout, _, code) = run_cli(&["log", "list", "--json"]);
    assert_eq!(code, 0, "Log list failed");
    assert!(stdout.contains(id));

    let (stdout, _, code) = run_cli(&["log", "remove", id]);
    assert_eq!(code, 0, "Log remove failed");
    assert!(stdout.contains("removed"));
}

#[test]
fn test_log_add_rejects_backwards_range() {
    let (_, _, code) = run_cli(&[
        "log",
        "add",
        "2026-01-11T07:00:00Z",
        "2026-01-10T23:00:00Z",
    ]);
    assert_ne!(code, 0, "Backwards range should be rejected");
}

#[test]
fn test_completions_bash() {
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "Completions failed");
    assert!(stdout.contains("lucero"));
}
