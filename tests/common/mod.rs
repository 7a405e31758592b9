#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

use comments_api::app::comments::CommentService;
use comments_api::config::AppConfig;
use comments_api::domain::comment::Comment;
use comments_api::infra::bootstrap::{self, Bootstrap};
use comments_api::infra::db::Db;
use comments_api::AppState;

// ---------------------------------------------------------------------------
// TestApp: one fresh on-disk store per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub bootstrap: Bootstrap,
    dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn detail(&self) -> String {
        self.json()["detail"].as_str().unwrap_or("").to_string()
    }

    pub fn comments(&self) -> Vec<Comment> {
        serde_json::from_slice(&self.body_bytes).expect("body is not a comment list")
    }
}

pub fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        http_addr: "127.0.0.1:0".to_string(),
        data_dir: dir.join("store"),
        fixture_path: dir.join("comments.json"),
        cors_origins: vec!["http://localhost:3000".to_string()],
        db_max_connections: 5,
        db_connect_timeout_seconds: 5,
    }
}

/// Empty store, no fixture.
pub async fn app() -> TestApp {
    TestApp::with_fixture(None).await
}

impl TestApp {
    /// Writes `fixture` (if any) next to the store, then bootstraps the same
    /// way the binary does at startup.
    pub async fn with_fixture(fixture: Option<Value>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = test_config(dir.path());

        if let Some(fixture) = fixture {
            std::fs::write(&config.fixture_path, fixture.to_string())
                .expect("failed to write fixture");
        }

        let db = Db::connect(&config).await.expect("Db::connect failed");
        let bootstrap = bootstrap::ensure_comments_table(&db, &config.fixture_path)
            .await
            .expect("bootstrap failed");

        let state = AppState { db };
        let router = comments_api::http::router(state.clone());

        TestApp {
            router,
            state,
            bootstrap,
            dir,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn service(&self) -> CommentService {
        CommentService::new(self.state.db.clone())
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Create a comment through the API and return the stored record.
    pub async fn create_comment(&self, text: &str) -> Comment {
        let resp = self
            .post_json("/comments", serde_json::json!({ "text": text }))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        serde_json::from_value(resp.json()).expect("response is not a comment")
    }

    /// Insert a fully specified row directly, bypassing server defaults.
    pub async fn insert_comment(&self, id: &str, text: &str, date: &str) -> Comment {
        let comment = Comment {
            id: id.to_string(),
            author: "Seed".to_string(),
            text: text.to_string(),
            date: date.to_string(),
            likes: 3,
            image: "https://example.com/seed.png".to_string(),
        };
        sqlx::query(
            "INSERT INTO comments (id, author, text, date, likes, image) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.author)
        .bind(&comment.text)
        .bind(&comment.date)
        .bind(comment.likes)
        .bind(&comment.image)
        .execute(self.state.db.pool())
        .await
        .expect("insert test comment failed");
        comment
    }

    pub async fn count(&self) -> i64 {
        self.service().count().await.expect("count failed")
    }

    /// Every row in insertion order.
    pub async fn snapshot(&self) -> Vec<Comment> {
        self.service()
            .list(comments_api::domain::comment::SortMode::Unsorted)
            .await
            .expect("list failed")
    }

    /// Make the store reject in-place updates of the comments table.
    pub async fn reject_updates(&self) {
        sqlx::query(
            "CREATE TRIGGER reject_comment_updates BEFORE UPDATE ON comments \
             BEGIN SELECT RAISE(ABORT, 'updates are disabled'); END",
        )
        .execute(self.state.db.pool())
        .await
        .expect("failed to install update trigger");
    }

    /// Make the store reject new rows in the comments table.
    pub async fn reject_inserts(&self) {
        sqlx::query(
            "CREATE TRIGGER reject_comment_inserts BEFORE INSERT ON comments \
             BEGIN SELECT RAISE(ABORT, 'inserts are disabled'); END",
        )
        .execute(self.state.db.pool())
        .await
        .expect("failed to install insert trigger");
    }

    /// Make every in-place update fail after the target row has been removed,
    /// as if another request deleted it first.
    pub async fn delete_on_update(&self) {
        sqlx::query(
            "CREATE TRIGGER delete_on_comment_update BEFORE UPDATE ON comments \
             BEGIN DELETE FROM comments WHERE id = OLD.id; \
             SELECT RAISE(FAIL, 'row was removed'); END",
        )
        .execute(self.state.db.pool())
        .await
        .expect("failed to install update trigger");
    }
}
