#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use oxide_nlq::prelude::*;
use oxide_nlq_core::Normalizer;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A model that answers every prompt with the same text.
pub struct ScriptedModel {
    response: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelService for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> oxide_nlq::error::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

/// An in-memory store holding the sample company database.
pub async fn sample_store() -> Store {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    let store = Store::new(pool);
    store
        .bootstrap_sample()
        .await
        .expect("Failed to create sample database");
    store
}

/// An assistant over the sample database answering with `response`.
pub async fn scripted_assistant(response: &str) -> Assistant<ScriptedModel> {
    Assistant::new(
        ScriptedModel::new(response),
        sample_store().await,
        Normalizer::default(),
    )
}

/// Serves one HTTP request with `status` and `body`, returning the raw request.
pub async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A URL nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
