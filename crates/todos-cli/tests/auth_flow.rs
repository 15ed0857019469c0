
use std::fs;

use fixtures::{EMAIL, id_token, seed_session, todos};
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_empty_login_shows_both_errors_without_calling_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    todos(dir.path(), &server.uri())
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Email is Required"))
        .stderr(predicate::str::contains("Password is required"));

    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_login_stores_session_then_whoami() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "AWSCognitoIdentityProviderService.InitiateAuth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": id_token(EMAIL, "Rick Sanchez"),
                "AccessToken": "access",
                "RefreshToken": "refresh",
                "ExpiresIn": 3600
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    todos(dir.path(), &server.uri())
        .args(["login", "--email", EMAIL])
        .env("TODOS_PASSWORD", "pickle-rick")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Signed in as {EMAIL}")));

    let storage: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("session.json")).unwrap()).unwrap();
    assert_eq!(
        storage["CognitoIdentityServiceProvider.test-client.LastAuthUser"],
        EMAIL
    );

    todos(dir.path(), &server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains(EMAIL))
        .stdout(predicate::str::contains("Rick Sanchez"));
}

#[tokio::test]
async fn test_rejected_login_prints_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        })))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    todos(dir.path(), &server.uri())
        .args(["login", "-e", EMAIL, "-p", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect username or password."));
}

#[test]
fn test_logout_clears_session() {
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &id_token(EMAIL, "Rick"));

    todos(dir.path(), "http://127.0.0.1:9")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    todos(dir.path(), "http://127.0.0.1:9")
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_landing_for_anonymous_user() {
    let dir = tempdir().unwrap();

    todos(dir.path(), "http://127.0.0.1:9")
        .env("TODOS_HOSTED_UI_ENDPOINT", "https://auth.example.com/signup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to your TODOs"))
        .stdout(predicate::str::contains("https://auth.example.com/signup"));
}

#[test]
fn test_register_prints_hosted_ui() {
    let dir = tempdir().unwrap();

    todos(dir.path(), "http://127.0.0.1:9")
        .env("TODOS_HOSTED_UI_ENDPOINT", "https://auth.example.com/signup")
        .arg("register")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://auth.example.com/signup"));
}

#[tokio::test]
async fn test_register_through_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "AWSCognitoIdentityProviderService.SignUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "UserConfirmed": false,
            "UserSub": "sub-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    todos(dir.path(), &server.uri())
        .args(["register", "-e", "morty@example.com", "-n", "Morty", "-p", "aw-jeez"])
        .assert()
        .success()
        .stdout(predicate::str::contains("confirmation code"));
}
