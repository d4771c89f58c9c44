//! Serving side of wirebench: a per-worker echo API and the process pool that keeps
//! `N` workers alive.
mod error;
pub use error::{ApiError, PoolError, ServerError};

mod config;
pub use config::{ServerConfig, default_parallelism};

mod http;
pub use http::{EchoApi, MAX_BODY_BYTES};

mod listener;
pub use listener::bind_listener;

mod serve;
pub use serve::{run_worker, serve, shutdown_signal};

mod util;

pub mod pool;
pub use pool::{PoolConfig, WORKER_SLOT_ENV, WorkerCommand, WorkerPool, WorkerRegistry};

pub use axum;
pub use taskvisor;
