//! Local stand-in for the qauto deployment.
//!
//! Serves a replica of the landing page and sign-up modal and answers
//! `POST /api/auth/signup` from an in-memory user list, so the scenarios
//! can run without network access.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use parking_lot::Mutex;
use qauto_browser_test::AppServer;
use qauto_pom::SuiteConfig;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

const REGISTRATION_PAGE: &str = include_str!("../fixtures/registration.html");

type Users = Arc<Mutex<HashSet<String>>>;

pub struct FixtureApp {
    base_url: String,
    users: Users,
    server: JoinHandle<()>,
}

impl FixtureApp {
    /// Binds an ephemeral port on localhost and starts serving.
    pub async fn start() -> std::io::Result<Self> {
        let users = Users::default();
        let router = Router::new()
            .route("/", get(landing))
            .route("/panel/garage", get(landing))
            .route("/api/auth/signup", post(signup))
            .with_state(Arc::clone(&users));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("fixture server stopped: {e}");
            }
        });

        Ok(Self {
            base_url,
            users,
            server,
        })
    }

    /// Emails that signed up successfully so far.
    pub fn registered(&self) -> usize {
        self.users.lock().len()
    }
}

impl AppServer for FixtureApp {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for FixtureApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn landing() -> Html<&'static str> {
    Html(REGISTRATION_PAGE)
}

async fn signup(State(users): State<Users>, Json(body): Json<Value>) -> impl IntoResponse {
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    if email.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "Email required" })),
        );
    }

    if users.lock().insert(email) {
        (StatusCode::CREATED, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "User already exists" })),
        )
    }
}

/// Config for offline runs: no retries, artifacts in a temp dir.
pub fn fixture_config(artifacts: &TempDir) -> SuiteConfig {
    SuiteConfig {
        retries: Some(0),
        output_dir: artifacts.path().to_path_buf(),
        ..SuiteConfig::default()
    }
}
