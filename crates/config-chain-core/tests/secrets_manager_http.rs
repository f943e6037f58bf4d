//! End-to-end tests of the secrets source against a mock Secrets Manager endpoint

use config_chain_core::providers::{
    AwsSecretsManagerClient, ConfigurationSourceExt, MapSource, SecretsManagerConfig, SecretsManagerSource,
};
use config_chain_core::Configuration;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn secrets_source(server: &MockServer, secret_id: &str, timeout: Duration) -> SecretsManagerSource {
    let config = SecretsManagerConfig::default()
        .with_endpoint(server.uri())
        .with_static_credentials("AKIDEXAMPLE", "secret", None)
        .with_timeout(timeout);
    let client = AwsSecretsManagerClient::new(config).unwrap();
    SecretsManagerSource::new(secret_id, "eu-west-1", Arc::new(client))
}

#[tokio::test]
async fn fetches_secret_once_for_many_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "secretsmanager.GetSecretValue"))
        .and(body_json(json!({"SecretId": "app/prod"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "app/prod",
            "SecretString": "{\"db.user\": \"app\", \"db.password\": \"s3cret\"}"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Configuration::of([
        secrets_source(&server, "app/prod", Duration::from_secs(5)).shared(),
        MapSource::from_pairs([("db.host", "localhost")]).shared(),
    ]);

    assert_eq!(config.require("db.user").await.unwrap(), "app");
    assert_eq!(config.require("db.password").await.unwrap(), "s3cret");
    assert_eq!(config.get("db.host").await, Some("localhost".to_string()));
    assert_eq!(config.get("db.port").await, None);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_secret_falls_through_to_next_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "ResourceNotFoundException",
            "Message": "Secrets Manager can't find the specified secret."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Configuration::of([
        secrets_source(&server, "does-not-exist", Duration::from_secs(5)).shared(),
        MapSource::from_pairs([("user", "fallback")]).shared(),
    ]);

    assert_eq!(config.get("user").await, Some("fallback".to_string()));
    assert_eq!(config.get("pass").await, None);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn timeout_degrades_to_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"SecretString": "{\"user\": \"late\"}"}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = Configuration::of([
        secrets_source(&server, "slow", Duration::from_millis(200)).shared(),
        MapSource::from_pairs([("user", "fallback")]).shared(),
    ]);

    assert_eq!(config.get("user").await, Some("fallback".to_string()));
    // The failed fetch is cached; no second request is made
    assert_eq!(config.get("user").await, Some("fallback".to_string()));
    assert_eq!(config.get("other").await, None);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn plaintext_secret_answers_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"SecretString": "this is not JSON"})))
        .mount(&server)
        .await;

    let source = secrets_source(&server, "plain", Duration::from_secs(5));
    let config = Configuration::from_source(source);

    assert_eq!(config.get("user").await, None);
    assert!(config.require("user").await.is_err());
}

#[tokio::test]
async fn signs_with_shared_profile_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let credentials_file = dir.path().join("credentials");
    std::fs::write(
        &credentials_file,
        "[prod]\naws_access_key_id = AKIDPROFILE\naws_secret_access_key = profile-secret\n",
    )
    .unwrap();
    let config_file = dir.path().join("config");
    std::fs::write(&config_file, "").unwrap();

    for var in ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"] {
        std::env::remove_var(var);
    }
    std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", &credentials_file);
    std::env::set_var("AWS_CONFIG_FILE", &config_file);
    std::env::set_var("AWS_PROFILE", "prod");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SecretString": "{\"user\": \"from-profile\"}"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = SecretsManagerConfig::from_env()
        .with_endpoint(server.uri())
        .with_timeout(Duration::from_secs(5));
    let client = AwsSecretsManagerClient::new(config).unwrap();
    let source = SecretsManagerSource::new("app/prod", "eu-west-1", Arc::new(client));

    assert_eq!(source.get("user").await, Some("from-profile".to_string()));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let authorization = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(authorization.contains("Credential=AKIDPROFILE/"));

    for var in ["AWS_SHARED_CREDENTIALS_FILE", "AWS_CONFIG_FILE", "AWS_PROFILE"] {
        std::env::remove_var(var);
    }
}
