#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use register_gate::api;
use register_gate::config::Config;
use register_gate::state::AppState;
use register_gate::ui::Pages;

pub const INVITE: &str = "invite=abc123";

/// A running app backed by a temp directory holding templates, static
/// assets and a `sh` script standing in for the browser automation.
pub struct TestApp {
    pub app: Router,
    dir: TempDir,
}

impl TestApp {
    /// Whether the automation script was started at least once.
    pub fn automation_invoked(&self) -> bool {
        self.dir.path().join("invoked").exists()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Build an app whose automation script runs `script_body` under `sh`.
///
/// Templates render as `PAGE|message|message_type` so tests can tell pages apart.
pub fn test_app(script_body: &str) -> TestApp {
    test_app_with(script_body, &[])
}

pub fn test_app_with(script_body: &str, extra: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");

    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(
        templates.join("register.html"),
        "FORM|{{ message }}|{{ message_type }}",
    )
    .unwrap();
    std::fs::write(
        templates.join("register-forbidden.html"),
        "FORBIDDEN|{{ message }}|{{ message_type }}",
    )
    .unwrap();
    std::fs::write(
        templates.join("register-success.html"),
        "SUCCESS|{{ message }}|{{ message_type }}",
    )
    .unwrap();

    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("app.css"), "body { color: red; }").unwrap();

    let marker = dir.path().join("invoked");
    let script = dir.path().join("register.sh");
    std::fs::write(
        &script,
        format!("touch '{}'\n{script_body}\n", marker.display()),
    )
    .unwrap();

    let mut vars: HashMap<String, String> = [
        ("URL_PARAM", "invite".to_owned()),
        ("EXPECTED_VALUE", "abc123".to_owned()),
        ("OVERLEAF_URL", "http://overleaf.test".to_owned()),
        ("ADMIN_EMAIL", "admin@test".to_owned()),
        ("ADMIN_PASSWORD", "s3cret".to_owned()),
        ("NODE_PATH", "sh".to_owned()),
        ("SCRIPT_PATH", path_str(&script)),
        ("TEMPLATES_DIR", path_str(&templates)),
        ("STATIC_DIR", path_str(&static_dir)),
        ("AUTOMATION_TIMEOUT_SECS", "10".to_owned()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect();
    for (k, v) in extra {
        vars.insert((*k).to_owned(), (*v).to_owned());
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned());
    let pages = Pages::load(&config.templates_dir).expect("templates load");
    let app = api::app(AppState::new(config, pages));

    TestApp { app, dir }
}

fn path_str(path: &Path) -> String {
    path.to_str().expect("utf-8 temp path").to_owned()
}

/// Send a request with an optional form body. Returns status, headers and body text.
pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    form: Option<&str>,
) -> (StatusCode, HeaderMap, String) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match form {
        Some(form) => {
            builder = builder.header("Content-Type", "application/x-www-form-urlencoded");
            Body::from(form.to_owned())
        }
        None => Body::empty(),
    };
    let req = builder.body(body).unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, HeaderMap, String) {
    send(app, Method::GET, path, None).await
}

pub async fn post_form(app: &Router, path: &str, form: &str) -> (StatusCode, HeaderMap, String) {
    send(app, Method::POST, path, Some(form)).await
}

/// POST a `multipart/form-data` body built from text `fields`.
pub async fn post_multipart(
    app: &Router,
    path: &str,
    fields: &[(&str, &str)],
) -> (StatusCode, HeaderMap, String) {
    const BOUNDARY: &str = "register-gate-test-boundary";

    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let req = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}
