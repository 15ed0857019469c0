
use fixtures::{EMAIL, id_token, seed_session, todos};
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(sk: &str, title: &str) -> serde_json::Value {
    json!({
        "PK": format!("USER#{EMAIL}"),
        "SK": sk,
        "todo_title": title,
        "todo_details": "Default details",
        "todo_date": "2025-12-31",
        "is_done": "False"
    })
}

#[tokio::test]
async fn test_list_renders_header_and_items() {
    let server = MockServer::start().await;
    let token = id_token(EMAIL, "Rick");
    Mock::given(method("GET"))
        .and(path("/todos"))
        .and(query_param("user_email", EMAIL))
        .and(header("authorization", token.as_str()))
        .and(header_exists("correlation-id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([item("TODO#01HXABC", "Buy milk")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &token);

    todos(dir.path(), &server.uri())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Welcome back: {EMAIL}")))
        .stdout(predicate::str::contains("TODO#01HXABC"))
        .stdout(predicate::str::contains("Buy milk"));
}

#[tokio::test]
async fn test_landing_redirects_signed_in_user_to_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &id_token(EMAIL, "Rick"));

    todos(dir.path(), &server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Welcome back: {EMAIL}")))
        .stdout(predicate::str::contains("No todos yet"));
}

#[tokio::test]
async fn test_list_server_error_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &id_token(EMAIL, "Rick"));

    todos(dir.path(), &server.uri())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to list todos: HTTP 500"));
}

#[tokio::test]
async fn test_list_without_session_asks_for_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    todos(dir.path(), &server.uri())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_signed_out_hint_wins_over_bad_backend_url() {
    let dir = tempdir().unwrap();

    for args in [&["list"][..], &["add", "Buy milk"], &["rm", "TODO#1"]] {
        todos(dir.path(), "http://127.0.0.1:9")
            .env("TODOS_BACKEND_URL", "not a url")
            .args(args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not signed in"))
            .stderr(predicate::str::contains("backend URL").not());
    }
}

#[tokio::test]
async fn test_add_posts_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/todos"))
        .and(body_partial_json(json!({
            "user_email": EMAIL,
            "todo_title": "Buy milk",
            "todo_details": "Default details",
            "todo_date": "2025-12-31"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(item("TODO#01HXABC", "Buy milk")))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &id_token(EMAIL, "Rick"));

    todos(dir.path(), &server.uri())
        .args(["add", "Buy milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created TODO#01HXABC Buy milk"));
}

#[tokio::test]
async fn test_rm_accepts_bare_id_and_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/todos/01HXABC"))
        .and(query_param("user_email", EMAIL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/todos/01HXABC"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "item does not exist"
        })))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &id_token(EMAIL, "Rick"));

    todos(dir.path(), &server.uri())
        .args(["rm", "01HXABC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted TODO#01HXABC"));

    todos(dir.path(), &server.uri())
        .args(["rm", "TODO#01HXABC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to delete todo"))
        .stderr(predicate::str::contains("item does not exist"));
}

#[tokio::test]
async fn test_done_and_show() {
    let server = MockServer::start().await;
    let mut done = item("TODO#01HXABC", "Buy milk");
    done["is_done"] = json!("True");
    Mock::given(method("PATCH"))
        .and(path("/todos/01HXABC"))
        .and(body_partial_json(json!({"is_done": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(done.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/todos/01HXABC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(done))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/todos/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    seed_session(dir.path(), EMAIL, &id_token(EMAIL, "Rick"));

    todos(dir.path(), &server.uri())
        .args(["done", "01HXABC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked TODO#01HXABC as done"));

    todos(dir.path(), &server.uri())
        .args(["show", "01HXABC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"));

    todos(dir.path(), &server.uri())
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No todo with sort key TODO#missing"));
}
