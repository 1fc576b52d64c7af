// Integration tests for CLI commands
// Run with: cargo test --test cli_commands_test

use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sharepush(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sharepush"));
    cmd.env("SHAREPUSH_CONFIG_DIR", config_dir.path())
        .env("SHAREPUSH_ENV", "test")
        .env_remove("SHAREPUSH_CONTENT_URL")
        .env_remove("SHAREPUSH_SAVE_TOKEN_URL")
        .env_remove("SHAREPUSH_LOG_FILE");
    cmd
}

#[test]
fn test_content_command_prints_descriptor() {
    let config_dir = TempDir::new().unwrap();
    let output = sharepush(&config_dir)
        .env("SHAREPUSH_CONTENT_URL", "https://example.com/app")
        .arg("content")
        .output()
        .expect("Failed to execute content command");

    assert!(output.status.success(), "Command should succeed");
    let descriptor: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(descriptor["uri"], "https://example.com/app");
    assert!(descriptor["injectedJavaScript"]
        .as_str()
        .unwrap()
        .contains("ReactNativeWebView.postMessage"));
}

#[test]
fn test_config_command_reads_config_file() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(
        config_dir.path().join("config.json"),
        r#"{"project_id": "from-file", "max_retries": 5}"#,
    )
    .unwrap();

    let output = sharepush(&config_dir)
        .arg("config")
        .output()
        .expect("Failed to execute config command");

    assert!(output.status.success(), "Command should succeed");
    let config: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["project_id"], "from-file");
    assert_eq!(config["max_retries"], 5);
    assert_eq!(config["retry_delay_ms"], 5000);
    assert_eq!(config["include_identity"], false);
}

#[tokio::test]
async fn test_deliver_command_posts_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pushes/saveToken"))
        .and(body_json(json!({
            "token": "abc123",
            "deviceInfo": {"os": std::env::consts::OS, "model": "Test Device"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let config_dir = TempDir::new().unwrap();
    let mut cmd = tokio::process::Command::from(sharepush(&config_dir));
    let output = cmd
        .env(
            "SHAREPUSH_SAVE_TOKEN_URL",
            format!("{}/api/pushes/saveToken", server.uri()),
        )
        .env("SHAREPUSH_DEVICE_MODEL", "Test Device")
        .args(["deliver", "--token", "abc123"])
        .output()
        .await
        .expect("Failed to execute deliver command");

    assert!(output.status.success(), "Command should succeed");
    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome, json!({"state": "delivered", "attempt": 0, "message": "ok"}));
}

#[tokio::test]
async fn test_deliver_command_fails_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pushes/saveToken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config_dir = TempDir::new().unwrap();
    let mut cmd = tokio::process::Command::from(sharepush(&config_dir));
    let output = cmd
        .env(
            "SHAREPUSH_SAVE_TOKEN_URL",
            format!("{}/api/pushes/saveToken", server.uri()),
        )
        .env("SHAREPUSH_MAX_RETRIES", "1")
        .env("SHAREPUSH_RETRY_DELAY_MS", "10")
        .args(["deliver", "--token", "abc123", "--user", "u1"])
        .output()
        .await
        .expect("Failed to execute deliver command");

    assert!(!output.status.success(), "Command should fail");
    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["state"], "gave_up");
    assert_eq!(outcome["attempt"], 1);
}
