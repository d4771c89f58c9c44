use std::any::Any;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, error, trace};
use wirebench_model::{ContentKind, ErrorBody, HealthStatus, ReceivedPayloadInfo};

use crate::error::ApiError;

/// Largest accepted request body (15 MiB).
pub const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

/// Echo API served by one worker.
pub struct EchoApi {
    pid: u32,
    max_body_bytes: usize,
}

#[derive(Clone, Copy)]
struct Ctx {
    pid: u32,
}

impl EchoApi {
    /// `pid` is reported in every response body.
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /health - Liveness with worker pid
    /// - POST /json - Acknowledge a JSON payload
    /// - POST /xml - Acknowledge an XML payload
    pub fn router(self) -> Router {
        let routes = Router::new()
            .route("/health", get(health))
            .route("/json", post(receive_json))
            .route("/xml", post(receive_xml))
            .fallback(not_found)
            .with_state(Ctx { pid: self.pid });

        self.wrap(routes)
    }

    /// Body limit and panic boundary, applied to every route.
    fn wrap(&self, routes: Router) -> Router {
        let pid = self.pid;
        routes
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
                on_panic(pid, panic)
            }))
    }
}

fn on_panic(pid: u32, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(pid, %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::internal(pid)),
    )
        .into_response()
}

/// GET /health
async fn health(State(ctx): State<Ctx>) -> Json<HealthStatus> {
    trace!(pid = ctx.pid, "health");
    Json(HealthStatus {
        ok: true,
        pid: ctx.pid,
    })
}

/// POST /json
async fn receive_json(
    State(ctx): State<Ctx>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let info = accept(ctx, ContentKind::Json, &headers, body)?;
    Ok(Json(info.json_ack()))
}

/// POST /xml
async fn receive_xml(
    State(ctx): State<Ctx>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let info = accept(ctx, ContentKind::Xml, &headers, body)?;
    Ok(([(CONTENT_TYPE, ContentKind::Xml.mime())], info.xml_ack().render()))
}

/// Payloads are never parsed; only the raw byte length is reported.
///
/// The size limit wins over the media type: an oversized body is 413 whatever it claims to be.
fn accept(
    ctx: Ctx,
    kind: ContentKind,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<ReceivedPayloadInfo, ApiError> {
    let body = body.map_err(|rejection| ApiError::Body {
        rejection,
        pid: ctx.pid,
    })?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !kind.accepts(content_type) {
        return Err(ApiError::UnsupportedMediaType {
            kind,
            content_type: content_type.to_string(),
            pid: ctx.pid,
        });
    }

    debug!(pid = ctx.pid, kind = %kind, bytes = body.len(), "payload received");
    Ok(ReceivedPayloadInfo::new(kind, body.len(), ctx.pid))
}

async fn not_found(State(ctx): State<Ctx>, uri: Uri) -> ApiError {
    ApiError::NotFound {
        path: uri.path().to_string(),
        pid: ctx.pid,
    }
}
