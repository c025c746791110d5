//! Binary-level checks that need no backend.

mod common;

use serde_json::Value;

use common::run_cli_case;

fn json_line(stdout: &str) -> Value {
    let line = stdout.lines().last().unwrap_or_default();
    serde_json::from_str(line).unwrap_or_else(|e| panic!("not JSON ({e}): {stdout}"))
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case("help", home.path(), &["--help"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    for command in [
        "login",
        "signup",
        "reset-password",
        "profile",
        "feed",
        "people",
        "notifications",
        "post",
        "config",
    ] {
        assert!(result.stdout.contains(command), "missing {command}");
    }
}

#[test]
fn config_path_reports_missing_file() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config.toml");
    let config_arg = config.to_string_lossy().to_string();
    let result = run_cli_case(
        "config_path",
        home.path(),
        &["--json", "--config", &config_arg, "config", "path"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = json_line(&result.stdout);
    assert_eq!(payload["exists"], Value::Bool(false));
    assert_eq!(payload["path"], Value::String(config_arg));
}

#[test]
fn explicit_missing_config_is_a_runtime_error() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("nope.toml");
    let result = run_cli_case(
        "config_show_missing",
        home.path(),
        &["--config", &config.to_string_lossy(), "config", "show"],
    );
    assert_eq!(result.status.code(), Some(2));
    assert!(result.stderr.starts_with("nightlight: "));
}

#[test]
fn config_show_reflects_file_and_env() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config.toml");
    std::fs::write(&config, "[paging]\npage_size = 7\n").unwrap();
    let result = run_cli_case(
        "config_show",
        home.path(),
        &["--json", "--config", &config.to_string_lossy(), "config", "show"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = json_line(&result.stdout);
    assert_eq!(payload["config"]["paging"]["page_size"], 7);
    assert_eq!(payload["config"]["api"]["base_url"], "http://127.0.0.1:9");
    assert!(payload["hash"].as_str().is_some_and(|h| h.len() == 16));
}

#[test]
fn signup_is_validated_before_any_request() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case(
        "signup_invalid",
        home.path(),
        &["signup", "a!", "not-an-email", "--password", "short"],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("nightlight: "));
}

#[test]
fn reset_password_checks_length_before_any_request() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case(
        "reset_short",
        home.path(),
        &["reset-password", "tok-123", "--password", "short"],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("at least 8 characters"));
}

#[test]
fn profile_requires_a_session() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case("profile_signed_out", home.path(), &["profile"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("not signed in"));
}

#[test]
fn empty_post_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case("post_empty", home.path(), &["post", "   "]);
    assert_eq!(result.status.code(), Some(1));
}

#[test]
fn whoami_when_signed_out() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case("whoami", home.path(), &["--json", "whoami"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = json_line(&result.stdout);
    assert_eq!(payload["signed_in"], Value::Bool(false));
    assert_eq!(payload["token_balance"], 0);
}

#[test]
fn theme_is_saved_between_runs() {
    let home = tempfile::tempdir().unwrap();
    let set = run_cli_case("theme_set", home.path(), &["theme", "dark"]);
    assert!(set.status.success(), "log: {}", set.log_path.display());

    let get = run_cli_case("theme_get", home.path(), &["--json", "theme"]);
    assert_eq!(json_line(&get.stdout)["theme"], "dark");

    let saved = std::fs::read_to_string(home.path().join("preferences.json")).unwrap();
    assert!(saved.contains("\"dark\""));
}

#[test]
fn unreachable_backend_prints_load_failed_state() {
    let home = tempfile::tempdir().unwrap();
    let result = run_cli_case("feed_offline", home.path(), &["--json", "people"]);
    assert_eq!(result.status.code(), Some(2));
    let payload = json_line(&result.stdout);
    assert_eq!(payload["items"], Value::Array(Vec::new()));
    assert!(payload["empty_state"]["title"].is_string());
    assert!(result.stderr.contains("Could not connect"));
}
