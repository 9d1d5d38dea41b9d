#![allow(deprecated)]

/// End-to-end tests for the askverse binary
///
/// Every test points the binary at a temporary config file and either a
/// temporary store or `--ephemeral`, and never reaches a real provider.
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
mod common;

const OFFLINE_CONFIG: &str = "provider:\n  type: gemini\nsession:\n  typing_effect: false\n";

fn askverse(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("askverse").unwrap();
    cmd.env_remove("ASKVERSE_GEMINI_API_KEY")
        .env_remove("ASKVERSE_PROVIDER")
        .env_remove("ASKVERSE_STORE")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("askverse").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("askverse"));
}

#[test]
fn test_image_generate_then_list() {
    let (_config_dir, config_path) = common::temp_config_file(OFFLINE_CONFIG);
    let store_dir = TempDir::new().unwrap();
    let store_path = store_dir.path().join("store");

    askverse(&config_path)
        .arg("--storage-path")
        .arg(&store_path)
        .args(["image", "generate", "a cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a%20cat"));

    askverse(&config_path)
        .arg("--storage-path")
        .arg(&store_path)
        .args(["image", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a cat"));
}

#[test]
fn test_theme_is_persisted() {
    let (_config_dir, config_path) = common::temp_config_file(OFFLINE_CONFIG);
    let store_dir = TempDir::new().unwrap();
    let store_path = store_dir.path().join("store");

    askverse(&config_path)
        .arg("--storage-path")
        .arg(&store_path)
        .args(["theme", "dark"])
        .assert()
        .success();

    askverse(&config_path)
        .arg("--storage-path")
        .arg(&store_path)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));
}

#[test]
fn test_history_list_empty() {
    let (_config_dir, config_path) = common::temp_config_file(OFFLINE_CONFIG);

    askverse(&config_path)
        .args(["--ephemeral", "history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No chat history found."));
}

#[test]
fn test_history_show_out_of_range_fails() {
    let (_config_dir, config_path) = common::temp_config_file(OFFLINE_CONFIG);

    askverse(&config_path)
        .args(["--ephemeral", "history", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No chat at position 1"));
}

#[test]
fn test_ask_without_api_key_fails() {
    let (_config_dir, config_path) = common::temp_config_file(OFFLINE_CONFIG);

    askverse(&config_path)
        .args(["--ephemeral", "ask", "what is 2+2?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));
}

#[test]
fn test_invalid_provider_rejected() {
    let (_config_dir, config_path) =
        common::temp_config_file("provider:\n  type: carrier-pigeon\n");

    askverse(&config_path)
        .args(["--ephemeral", "history", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid provider type"));
}

#[test]
fn test_ephemeral_conflicts_with_storage_path() {
    let (_config_dir, config_path) = common::temp_config_file(OFFLINE_CONFIG);

    askverse(&config_path)
        .args(["--ephemeral", "--storage-path", "/tmp/unused", "history", "list"])
        .assert()
        .failure();
}
