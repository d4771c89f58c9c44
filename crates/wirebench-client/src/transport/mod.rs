use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::{trace, warn};
use wirebench_model::{ContentKind, Latency};

use crate::{ClientError, TransportConfig, TransportError};

/// One timed POST.
///
/// Implementations never fail the caller: a request that does not complete with a
/// 2xx status yields [`Latency::Failed`] and is logged.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, endpoint: &str, body: Bytes, kind: ContentKind) -> Latency;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(cfg: &TransportConfig) -> Result<Self, ClientError> {
        cfg.validate()?;

        // Measurements are taken against the server directly, never through a system proxy.
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
            .tcp_keepalive(cfg.tcp_keepalive);
        if let Some(timeout) = cfg.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::HttpClient)?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` and wait for the complete response body.
    ///
    /// The clock covers connection reuse/setup, upload, server time and download.
    pub async fn try_send(
        &self,
        endpoint: &str,
        body: Bytes,
        kind: ContentKind,
    ) -> Result<Duration, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, kind.mime())
            .body(body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|source| TransportError::Body {
                url: url.clone(),
                source,
            })?;
        Ok(started.elapsed())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, endpoint: &str, body: Bytes, kind: ContentKind) -> Latency {
        let bytes = body.len();
        match self.try_send(endpoint, body, kind).await {
            Ok(elapsed) => {
                trace!(%kind, bytes, micros = elapsed.as_micros() as u64, "request completed");
                Latency::from_elapsed(elapsed)
            }
            Err(e) => {
                warn!(%kind, bytes, error = %e, "request failed; recording NaN");
                Latency::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{Router, http::StatusCode, routing::post};
    use tokio::net::TcpListener;

    async fn spawn_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn transport(base_url: String) -> HttpTransport {
        HttpTransport::new(&TransportConfig {
            base_url,
            request_timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn success_returns_positive_latency() {
        let app = Router::new().route(
            "/json",
            post(|body: Bytes| async move { format!("{}", body.len()) }),
        );
        let t = transport(spawn_server(app).await);

        let latency = t
            .send("/json", Bytes::from_static(b"{\"a\":1}"), ContentKind::Json)
            .await;
        assert!(matches!(latency, Latency::Micros(v) if v > 0.0));
    }

    #[tokio::test]
    async fn sends_content_type_of_kind() {
        let app = Router::new().route(
            "/xml",
            post(|headers: axum::http::HeaderMap| async move {
                match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
                    Some("application/xml") => StatusCode::OK,
                    _ => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                }
            }),
        );
        let t = transport(spawn_server(app).await);

        let result = t
            .try_send("/xml", Bytes::from_static(b"<a/>"), ContentKind::Xml)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_failure() {
        let app = Router::new().route("/json", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let t = transport(spawn_server(app).await);

        let err = t
            .try_send("/json", Bytes::new(), ContentKind::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 500, .. }));

        let latency = t.send("/json", Bytes::new(), ContentKind::Json).await;
        assert!(latency.is_failed());
    }

    #[tokio::test]
    async fn connection_refused_is_failure() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = transport(format!("http://{addr}"));
        let latency = t.send("/json", Bytes::new(), ContentKind::Json).await;
        assert!(latency.is_failed());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let t = transport("http://localhost:3000/".into());
        assert_eq!(t.base_url(), "http://localhost:3000");
    }
}
