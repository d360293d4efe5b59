//! Shared helpers for the HTTP-level tests.
//!
//! Every test builds its own in-process app over `MemoryStore`, a recording
//! mailer and a scratch upload directory, and drives it with `oneshot`.

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use shopfront_api::config::AppConfig;
use shopfront_api::database::MemoryStore;
use shopfront_api::services::email::{EmailError, Mailer, OutgoingEmail};
use shopfront_api::state::AppState;

pub const PASSWORD: &str = "correct-horse";
pub const MULTIPART_BOUNDARY: &str = "----shopfront-test-boundary";

/// Keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!(
            "shopfront-it-{}",
            hex::encode(rand::random::<[u8; 8]>())
        ));

        let mut config = AppConfig::development("integration-test-secret".to_string());
        config.server.upload_dir = upload_dir.clone();
        config.server.max_upload_bytes = 512 * 1024;
        config.security.bcrypt_cost = 4;

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(config, Arc::new(MemoryStore::new()), mailer.clone());

        Self {
            router: shopfront_api::app(state),
            mailer,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(with_auth(Request::get(uri), token).body(Body::empty())?).await
    }

    pub async fn json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let request = with_auth(Request::builder().method(method).uri(uri), token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        self.send(request).await
    }

    pub async fn register(&self, username: &str) -> Result<(StatusCode, Value)> {
        self.json(
            "POST",
            "/registration",
            None,
            serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
            }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(StatusCode, Value)> {
        let request = Request::post("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))?;
        self.send(request).await
    }

    /// Register, log in and return the bearer token
    pub async fn signup(&self, username: &str) -> Result<String> {
        let (status, body) = self.register(username).await?;
        anyhow::ensure!(status == StatusCode::OK, "registration failed: {status} {body}");

        let (status, body) = self.login(username, PASSWORD).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {status} {body}");
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    /// Token from the most recent verification email sent to `email`
    pub fn verification_token(&self, email: &str) -> Result<String> {
        let message = self
            .mailer
            .sent()
            .into_iter()
            .rev()
            .find(|m| m.to == email)
            .context("no email sent")?;
        let start = message.text_body.find("token=").context("no token in email")? + "token=".len();
        let token = message.text_body[start..]
            .split_whitespace()
            .next()
            .context("empty token")?;
        Ok(token.to_string())
    }

    pub async fn create_product(&self, token: &str, name: &str) -> Result<Value> {
        let (status, body) = self
            .json("POST", "/products", Some(token), product_body(name, "100", "75"))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed: {status} {body}");
        Ok(body["data"].clone())
    }

    pub async fn upload(&self, uri: &str, token: &str, filename: &str, bytes: &[u8]) -> Result<(StatusCode, Value)> {
        let request = Request::post(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(multipart_body(filename, bytes)))?;
        self.send(request).await
    }

    /// Stored files, ignoring anything still being written
    pub fn stored_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn product_body(name: &str, original_price: &str, new_price: &str) -> Value {
    serde_json::json!({
        "name": name,
        "category": "Electronics",
        "original_price": original_price,
        "new_price": new_price,
        "offer_expiration_date": "2030-01-31",
    })
}

pub fn multipart_body(filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(image::ImageFormat::Png, width, height)
}

pub fn jpg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(image::ImageFormat::Jpeg, width, height)
}

fn encode_image(format: image::ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}
