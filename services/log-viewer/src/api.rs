// services/log-viewer/src/api.rs
//
// Sources of log records and health snapshots: the proxy's HTTP endpoints

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use svckit::config::ApiConfig;
use svckit::{HealthSnapshot, LogRecord, LogsResponse, ViewerError};

pub const LOGS_PATH: &str = "/api/logs";
pub const HEALTH_PATH: &str = "/api/health";

/// Read side of the proxy's monitoring surface.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_logs(&self) -> Result<Vec<LogRecord>, ViewerError>;
    async fn fetch_health(&self) -> Result<HealthSnapshot, ViewerError>;
    fn describe(&self) -> String;
}

pub struct HttpLogSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLogSource {
    pub fn new(config: &ApiConfig) -> Result<Self, ViewerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ViewerError> {
        let url = self.endpoint(path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ViewerError::StatusError {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn fetch_logs(&self) -> Result<Vec<LogRecord>, ViewerError> {
        let response: LogsResponse = self.get_json(LOGS_PATH).await?;
        Ok(response.into_logs())
    }

    async fn fetch_health(&self) -> Result<HealthSnapshot, ViewerError> {
        self.get_json(HEALTH_PATH).await
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serves one canned HTTP response on an ephemeral port.
    fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn source(base_url: &str) -> HttpLogSource {
        HttpLogSource::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_trim_trailing_slash() {
        let source = source("http://localhost:5345/");
        assert_eq!(source.endpoint(LOGS_PATH), "http://localhost:5345/api/logs");
        assert_eq!(source.endpoint(HEALTH_PATH), "http://localhost:5345/api/health");
        assert_eq!(source.describe(), "http://localhost:5345");
    }

    #[tokio::test]
    async fn test_non_success_status_is_status_error() {
        let source = source(&serve_once("500 Internal Server Error", r#"{"error":"boom"}"#));
        let err = source.fetch_logs().await.unwrap_err();
        match err {
            ViewerError::StatusError { url, status } => {
                assert_eq!(status, 500);
                assert!(url.ends_with(LOGS_PATH), "got {}", url);
            }
            other => panic!("expected StatusError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let source = source(&serve_once("200 OK", "<html>proxy error page</html>"));
        let err = source.fetch_health().await.unwrap_err();
        assert!(matches!(err, ViewerError::DecodeError(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_body_without_logs_is_empty_list() {
        let source = source(&serve_once("200 OK", "{}"));
        let logs = source.fetch_logs().await.unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_logs_and_health_decode() {
        let logs_body = r#"{"logs":[{"timestamp":"2025-03-01T12:00:00Z","level":"WARN","message":"[STREAM ERROR a1] Status: 429","data":{"status":429}}],"count":1}"#;
        let logs = source(&serve_once("200 OK", logs_body)).fetch_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, "WARN");

        let health_body = r#"{"status":"healthy","active_users":2,"active_connections":5}"#;
        let health = source(&serve_once("200 OK", health_body)).fetch_health().await.unwrap();
        assert_eq!(health.active_connections, 5);
        assert_eq!(health.log_buffer_size, None);
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_network_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let source = source("http://127.0.0.1:9");
        let err = source.fetch_logs().await.unwrap_err();
        assert!(matches!(err, ViewerError::NetworkError(_)), "got {:?}", err);
        assert!(err.is_transient());
    }
}
