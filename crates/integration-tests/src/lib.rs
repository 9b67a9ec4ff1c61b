//! Integration tests for Folio.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the in-memory document store
//! cargo test -p folio-integration-tests
//!
//! # Live tests against a running server (FOLIO_BASE_URL, FOLIO_ADMIN_EMAIL,
//! # FOLIO_ADMIN_PASSWORD)
//! cargo test -p folio-integration-tests -- --ignored
//! ```
//!
//! The in-process tests build the full router with [`folio_server::routes::app`]
//! over a [`MemoryStore`] and drive it with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use folio_server::config::{DatabaseConfig, LogFormat, ServerConfig};
use folio_server::db::MemoryStore;
use folio_server::middleware::SESSION_COOKIE_NAME;
use folio_server::routes;
use folio_server::services::AdminAuthService;
use folio_server::state::AppState;

/// Seeded admin email.
pub const ADMIN_EMAIL: &str = "admin@example.com";
/// Seeded admin password.
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
/// Public URL the test config advertises.
pub const BASE_URL: &str = "http://localhost:5000";

static NEXT_DIR: AtomicU32 = AtomicU32::new(0);

/// A router over a fresh in-memory store with one seeded admin.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub async fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!(
            "folio-it-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&upload_dir);

        let config = ServerConfig {
            database: DatabaseConfig {
                uri: SecretString::from("mongodb://localhost:27017"),
                name: Some("folio_test".to_string()),
            },
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            base_url: BASE_URL.to_string(),
            upload_dir: upload_dir.clone(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let store = Arc::new(MemoryStore::new());
        AdminAuthService::new(store.as_ref())
            .seed(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        let state = AppState::new(config, store.clone());
        Self {
            state,
            store,
            upload_dir,
        }
    }

    /// Build the router. Each request gets a fresh one; state is shared.
    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// Send a request through the full router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// Log in through the JSON endpoint and return the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/admin/login",
                None,
                &serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login sets the session cookie")
    }

    /// Files currently in the upload directory.
    pub fn uploaded_files(&self) -> Vec<String> {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// `name=value` of the session cookie, if the response sets one.
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_string)
}

/// Build a request with an optional cookie and no body.
pub fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a JSON request with an optional cookie.
pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Boundary used by the multipart helpers.
const BOUNDARY: &str = "folio-test-boundary";

/// One file field of a multipart body.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub content: &'a [u8],
}

/// Build a multipart request with one file field.
pub fn multipart_request(
    uri: &str,
    cookie: Option<&str>,
    field: &str,
    file_name: &str,
    content_type: &str,
    content: &[u8],
) -> Request<Body> {
    multipart_files_request(
        uri,
        cookie,
        &[FilePart {
            field,
            file_name,
            content_type,
            content,
        }],
    )
}

/// Build a multipart request with any number of file fields.
pub fn multipart_files_request(
    uri: &str,
    cookie: Option<&str>,
    parts: &[FilePart<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                part.field, part.file_name, part.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len());
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// A PDF body of `len` bytes.
pub fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut content = b"%PDF-1.7\n".to_vec();
    content.resize(len.max(content.len()), b'0');
    content
}

/// Read a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
