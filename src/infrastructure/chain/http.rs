//! `ChainService` over the nodeos HTTP API

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::abi::AbiDocument;
use crate::domain::error::{ExplorerError, ExplorerResult};
use crate::domain::table::{ChainInfo, ChainService, RowPage, RowQuery, ScopeIndexPage};

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Shared HTTP client with a per-request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

#[derive(Debug, Deserialize)]
struct AbiResponse {
    #[serde(default)]
    abi: Option<AbiDocument>,
}

#[derive(Debug, Serialize)]
struct ScopeQuery<'a> {
    code: &'a str,
    table: &'a str,
    limit: u32,
}

/// Client bound to one endpoint
#[derive(Debug, Clone)]
pub struct HttpChainService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpChainService {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ExplorerResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/v1/chain/{}", self.endpoint, path);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            log::warn!("{} answered {}", url, status.as_u16());
            return Err(ExplorerError::remote(
                Some(status.as_u16()),
                error_message(&text).unwrap_or_else(|| status.to_string()),
            ));
        }

        serde_json::from_str(&text).map_err(|e| ExplorerError::Decode(format!("{}: {}", path, e)))
    }
}

#[async_trait::async_trait]
impl ChainService for HttpChainService {
    async fn get_abi(&self, account: &str) -> ExplorerResult<Option<AbiDocument>> {
        let response: AbiResponse = self
            .post("get_abi", &json!({ "account_name": account }))
            .await?;
        Ok(response.abi)
    }

    async fn get_table_by_scope(
        &self,
        code: &str,
        table: &str,
        limit: u32,
    ) -> ExplorerResult<ScopeIndexPage> {
        self.post("get_table_by_scope", &ScopeQuery { code, table, limit })
            .await
    }

    async fn get_table_rows(&self, query: &RowQuery) -> ExplorerResult<RowPage> {
        self.post("get_table_rows", query).await
    }

    async fn get_info(&self) -> ExplorerResult<ChainInfo> {
        self.post("get_info", &json!({})).await
    }
}

fn transport_error(error: reqwest::Error) -> ExplorerError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };
    ExplorerError::remote(error.status().map(|s| s.as_u16()), message)
}

/// Pull the most specific message out of a nodeos error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error");
    let detail = error
        .and_then(|e| e.get("details"))
        .and_then(Value::as_array)
        .and_then(|details| details.first())
        .and_then(|d| d.get("message"))
        .and_then(Value::as_str);
    let what = error.and_then(|e| e.get("what")).and_then(Value::as_str);
    let message = value.get("message").and_then(Value::as_str);
    detail.or(what).or(message).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Answer one request with a canned reply; the handle yields the raw request
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&received[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if received.len() >= end + 4 + length {
                    break;
                }
            }
            stream.write_all(reply.as_bytes()).unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });
        (endpoint, handle)
    }

    fn service(endpoint: String) -> HttpChainService {
        let http = build_client(Duration::from_secs(5)).unwrap();
        HttpChainService::new(http, endpoint)
    }

    #[tokio::test]
    async fn test_get_abi_posts_account_name() {
        let (endpoint, server) = serve_once("200 OK", r#"{"account_name":"alice"}"#);
        let abi = service(endpoint).get_abi("alice").await.unwrap();
        assert!(abi.is_none());

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1/chain/get_abi HTTP/1.1"));
        assert!(request.ends_with(r#"{"account_name":"alice"}"#));
    }

    #[tokio::test]
    async fn test_bad_request_maps_to_remote_400() {
        let body = r#"{"code":400,"message":"Bad Request","error":{"what":"Account lookup","details":[]}}"#;
        let (endpoint, server) = serve_once("400 Bad Request", body);
        let err = service(endpoint).get_abi("nobody").await.unwrap_err();
        server.join().unwrap();

        assert_eq!(
            err,
            ExplorerError::remote(Some(400), "Account lookup")
        );
        assert_eq!(
            err.to_string(),
            "account or table not found (HTTP 400); verify the selected network"
        );
    }

    #[tokio::test]
    async fn test_scope_index_request_shape() {
        let body = r#"{"rows":[{"code":"dex","scope":"alice","table":"orders","payer":"alice","count":2}],"more":""}"#;
        let (endpoint, server) = serve_once("200 OK", body);
        let page = service(endpoint)
            .get_table_by_scope("dex", "orders", 100)
            .await
            .unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].count, 2);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1/chain/get_table_by_scope HTTP/1.1"));
        assert!(request.ends_with(r#"{"code":"dex","table":"orders","limit":100}"#));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let (endpoint, server) = serve_once("200 OK", "<html></html>");
        let err = service(endpoint).get_info().await.unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ExplorerError::Decode(_)));
    }

    #[test]
    fn test_error_message_prefers_details() {
        let body = r#"{
            "code": 500,
            "message": "Internal Service Error",
            "error": {
                "what": "Table access error",
                "details": [{"message": "unknown table orders"}]
            }
        }"#;
        assert_eq!(error_message(body).as_deref(), Some("unknown table orders"));
        assert_eq!(
            error_message(r#"{"error": {"what": "unknown key"}}"#).as_deref(),
            Some("unknown key")
        );
        assert_eq!(
            error_message(r#"{"message": "bad"}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn test_abi_response_without_abi() {
        let response: AbiResponse =
            serde_json::from_str(r#"{"account_name": "alice"}"#).unwrap();
        assert!(response.abi.is_none());
        let response: AbiResponse =
            serde_json::from_str(r#"{"account_name": "alice", "abi": null}"#).unwrap();
        assert!(response.abi.is_none());
    }
}
