use std::time::Duration;

use axum::Router;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{info, warn};

use crate::{EchoApi, ServerConfig, ServerError, bind_listener};

/// Serve `app` until `shutdown` resolves, then give in-flight requests `grace` to finish.
///
/// New connections stop being accepted as soon as the signal fires.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, mut fired_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = fired_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        res = &mut server => return res.map_err(ServerError::Serve),
        Ok(()) = &mut fired_rx => {}
    }

    info!(grace_ms = grace.as_millis() as u64, "shutdown requested; draining in-flight requests");
    match tokio::time::timeout(grace, server).await {
        Ok(res) => res.map_err(ServerError::Serve),
        Err(_) => {
            warn!(grace_ms = grace.as_millis() as u64, "grace period elapsed with requests in flight");
            Err(ServerError::ShutdownTimeout(grace))
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received SIGTERM"),
    }
}

/// Run one worker: bind, serve the echo API, drain on signal.
pub async fn run_worker(cfg: &ServerConfig) -> Result<(), ServerError> {
    cfg.validate()?;
    let addr = cfg.socket_addr()?;

    let listener = bind_listener(addr, cfg.reuse_port).map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    let pid = std::process::id();
    info!(pid, %addr, reuse_port = cfg.reuse_port, "worker listening");

    let app = EchoApi::new(pid)
        .with_max_body_bytes(cfg.max_body_bytes)
        .router();

    serve(listener, app, shutdown_signal(), cfg.shutdown_grace).await?;
    info!(pid, "worker stopped");
    Ok(())
}
