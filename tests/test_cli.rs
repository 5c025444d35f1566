//! Command-line tests
mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{blocking, pulsewrap, DUMMY_URL};

// ============================================================================
// Help and argument errors
// ============================================================================

#[test]
fn test_help() {
    Command::cargo_bin("pulsewrap")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--cookie-jar"))
        .stdout(predicate::str::contains("--option"));
}

#[test]
fn test_version() {
    Command::cargo_bin("pulsewrap")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_url_is_an_error() {
    Command::cargo_bin("pulsewrap")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL"));
}

#[test]
fn test_unknown_option_name() {
    let r = pulsewrap(&["-o", "frobnicate=1", DUMMY_URL]);
    assert_eq!(r.exit_code, 1);
    assert!(r.stderr.contains("frobnicate"), "{}", r.stderr);
}

#[test]
fn test_invalid_method() {
    let r = pulsewrap(&["-X", "BAD METHOD", DUMMY_URL]);
    assert_eq!(r.exit_code, 1);
    assert!(r.stderr.contains("BAD METHOD"), "{}", r.stderr);
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_get_prints_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello"))
        .and(query_param("name", "world"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/hello", server.uri());
    let r = blocking(move || pulsewrap(&["-d", "name=world", "-X", "GET", &url])).await;

    assert_eq!(r.exit_code, 0, "{}", r.stderr);
    assert_eq!(r.stdout, "hello world");
}

#[tokio::test]
async fn test_include_prints_head() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Served-By", "mock").set_body_string("ok"))
        .mount(&server)
        .await;

    let url = server.uri();
    let r = blocking(move || pulsewrap(&["-i", &url])).await;

    assert_eq!(r.exit_code, 0, "{}", r.stderr);
    assert!(r.stdout.starts_with("HTTP/1.1 200 OK\r\n"), "{}", r.stdout);
    assert!(r.contains("x-served-by: mock\r\n"));
    assert!(r.stdout.ends_with("\r\n\r\nok"));
}

#[tokio::test]
async fn test_post_data_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("x-token", "t1"))
        .and(header("user-agent", "cli-test"))
        .and(body_string("a=1&b=2"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/submit", server.uri());
    let r = blocking(move || {
        pulsewrap(&["-d", "a=1", "-d", "b=2", "-H", "X-Token: t1", "-A", "cli-test", &url])
    })
    .await;

    assert_eq!(r.exit_code, 0, "{}", r.stderr);
    assert_eq!(r.stdout, "created");
}

#[tokio::test]
async fn test_head_flag() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Head", "yes"))
        .expect(1)
        .mount(&server)
        .await;

    let url = server.uri();
    let r = blocking(move || pulsewrap(&["-I", &url])).await;

    assert_eq!(r.exit_code, 0, "{}", r.stderr);
    assert!(r.contains("x-head: yes"));
}

#[tokio::test]
async fn test_follow_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let url = format!("{}/old", server.uri());
    let r = blocking(move || pulsewrap(&["-L", &url])).await;
    assert_eq!(r.stdout, "moved here");
}

#[tokio::test]
async fn test_config_file_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-from-config", "1"))
        .and(header("user-agent", "configured/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("configured"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "[client]\nuser_agent = \"configured/1\"\n\n[headers]\nX-From-Config = \"1\"\n",
    )
    .unwrap();

    let url = server.uri();
    let output = blocking(move || {
        Command::cargo_bin("pulsewrap")
            .unwrap()
            .arg("--config")
            .arg(&config)
            .arg(&url)
            .output()
            .unwrap()
    })
    .await;

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "configured");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_transport_failure_exit_code() {
    let r = pulsewrap(&[DUMMY_URL]);
    assert_eq!(r.exit_code, 1);
    assert!(r.stderr.contains("pulsewrap: 6 - "), "{}", r.stderr);
    assert!(r.stdout.is_empty());
}
