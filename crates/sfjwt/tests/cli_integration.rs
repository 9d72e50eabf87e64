//! End-to-end tests for the `sfjwt` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSA_KEY_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../sfjwt-oauth/tests/fixtures/rsa_private.pem"
);

/// A command isolated from the user's config and log directories.
fn sfjwt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sfjwt").unwrap();
    cmd.current_dir(dir.path())
        .env("SFJWT_CONFIG_DIR", dir.path())
        .env_remove("SFJWT_CONFIG")
        .env_remove("SFJWT_ISSUER")
        .env_remove("SFJWT_SUBJECT")
        .env_remove("SFJWT_KEY_FILE")
        .env_remove("SFJWT_ACCESS_TOKEN")
        .env_remove("SFJWT_INSTANCE_URL");
    cmd
}

fn signed_token(dir: &TempDir) -> String {
    let output = sfjwt(dir)
        .args(["sign", "--issuer", "3MVG9client", "--subject", "user@example.com"])
        .args(["--key-file", RSA_KEY_PATH])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sign"))
        .stdout(predicate::str::contains("exchange"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("start"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_sign_prints_compact_token() {
    let dir = TempDir::new().unwrap();
    let token = signed_token(&dir);
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_sign_json_output() {
    let dir = TempDir::new().unwrap();
    let output = sfjwt(&dir)
        .args(["--json", "sign", "--issuer", "3MVG9client"])
        .args(["--subject", "user@example.com", "--expiration", "300"])
        .args(["--audience", "https://test.salesforce.com"])
        .args(["--key-file", RSA_KEY_PATH])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["claims"]["iss"], "3MVG9client");
    assert_eq!(value["claims"]["aud"], "https://test.salesforce.com");
    assert_eq!(value["algorithm"], "RS256");
    let claims = &value["claims"];
    assert_eq!(
        claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
        300
    );
}

#[test]
fn test_sign_missing_issuer_fails() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["--json", "sign", "--subject", "user@example.com"])
        .args(["--key-file", RSA_KEY_PATH])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing_issuer"));
}

#[test]
fn test_sign_reports_missing_identity_before_reading_key() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["--json", "sign", "--subject", "user@example.com"])
        .args(["--key-file", "does-not-exist.pem"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing_issuer"));

    sfjwt(&dir)
        .args(["--json", "sign", "--issuer", "3MVG9client"])
        .args(["--key-file", "does-not-exist.pem"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing_subject"));
}

#[test]
fn test_sign_rejects_disallowed_algorithm() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["--json", "sign", "--issuer", "i", "--subject", "s"])
        .args(["--key-file", RSA_KEY_PATH, "--algorithm", "RS512"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unsupported_algorithm"));
}

#[test]
fn test_config_file_widens_algorithms() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("sfjwt.toml"),
        "[signing]\nallowed_algorithms = [\"RS256\", \"RS512\"]\n",
    )
    .unwrap();

    let output = sfjwt(&dir)
        .args(["--json", "sign", "--issuer", "i", "--subject", "s"])
        .args(["--key-file", RSA_KEY_PATH, "--algorithm", "RS512"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["algorithm"], "RS512");
}

#[test]
fn test_decode_round_trips_sign() {
    let dir = TempDir::new().unwrap();
    let token = signed_token(&dir);

    let output = sfjwt(&dir)
        .args(["--json", "decode", &token])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["header"]["alg"], "RS256");
    assert_eq!(value["payload"]["sub"], "user@example.com");
    assert_eq!(value["expired"], false);
}

#[test]
fn test_decode_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let token = signed_token(&dir);

    sfjwt(&dir)
        .args(["decode", "-"])
        .write_stdin(token)
        .assert()
        .success()
        .stdout(predicate::str::contains("3MVG9client"));
}

#[test]
fn test_decode_malformed_token() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["--json", "decode", "not-a-jwt"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("malformed_token"));
}

#[test]
fn test_config_show_defaults() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("https://login.salesforce.com"));
}

#[test]
fn test_config_show_reports_loaded_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[server]\nport = 9999\n").unwrap();

    sfjwt(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("9999"));
}

#[test]
fn test_query_requires_token() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["--json", "query", "SELECT Id FROM Account"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing_token"));
}

#[test]
fn test_exchange_unreachable_is_network_error() {
    let dir = TempDir::new().unwrap();
    sfjwt(&dir)
        .args(["--json", "exchange", "--jwt", "a.b.c"])
        .args(["--audience", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("network_error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exchange_relays_provider_response() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "00Dxx!AQ",
            "instance_url": "https://org.my.salesforce.com",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let audience = mock.uri();
    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        sfjwt(&dir)
            .args(["--json", "exchange", "--jwt", "a.b.c", "--audience", &audience])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], 200);
    assert_eq!(value["body"]["instance_url"], "https://org.my.salesforce.com");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exchange_provider_rejection_exits_nonzero() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "user hasn't approved this consumer"
        })))
        .mount(&mock)
        .await;

    let audience = mock.uri();
    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        sfjwt(&dir)
            .args(["exchange", "--jwt", "a.b.c", "--audience", &audience])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("invalid_grant"));
    assert!(stdout.contains("400"));
}
