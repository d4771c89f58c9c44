use std::{io, time::Duration};

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};
use wirebench_model::{ContentKind, ErrorBody};

/// Worker process failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] io::Error),

    #[error("in-flight requests did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Supervisor failures.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid pool config: {0}")]
    InvalidConfig(String),

    #[error("cannot resolve worker executable: {0}")]
    Executable(#[source] io::Error),

    #[error("failed to spawn worker {slot}: {source}")]
    Spawn {
        slot: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for worker {slot}: {source}")]
    Wait {
        slot: usize,
        #[source]
        source: io::Error,
    },

    #[error("supervisor error: {0}")]
    Supervisor(String),
}

/// Request-level failure, answered with `{error, pid}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unsupported content type '{content_type}' for {kind}")]
    UnsupportedMediaType {
        kind: ContentKind,
        content_type: String,
        pid: u32,
    },

    #[error("{rejection}")]
    Body { rejection: BytesRejection, pid: u32 },

    #[error("no route for {path}")]
    NotFound { path: String, pid: u32 },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Body { rejection, .. } => rejection.status(),
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn pid(&self) -> u32 {
        match self {
            ApiError::UnsupportedMediaType { pid, .. }
            | ApiError::Body { pid, .. }
            | ApiError::NotFound { pid, .. } => *pid,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(pid = self.pid(), %status, error = %self, "request failed");
        } else {
            debug!(pid = self.pid(), %status, error = %self, "request rejected");
        }
        (status, Json(ErrorBody::new(self.to_string(), self.pid()))).into_response()
    }
}
