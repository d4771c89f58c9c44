use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wirebench_observe::{ColorMode, LoggerConfig, LoggerFormat, SupervisorEvents, logger_init};
use wirebench_server::{
    MAX_BODY_BYTES, PoolConfig, ServerConfig, WORKER_SLOT_ENV, WorkerCommand, WorkerPool,
    default_parallelism, run_worker, shutdown_signal, taskvisor::Subscribe,
};

/// Echo server for payload benchmarks: one supervisor, `N` worker processes sharing a port.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Worker processes; defaults to the available parallelism
    #[arg(long, env = "WORKERS")]
    workers: Option<usize>,

    /// Larger request bodies are answered with 413
    #[arg(long, default_value_t = MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Time in-flight requests get after SIGTERM
    #[arg(long, default_value_t = 5000)]
    shutdown_grace_ms: u64,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// text | json | journald
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: LoggerFormat,

    /// auto | always | never
    #[arg(long, default_value = "auto")]
    log_color: ColorMode,

    /// Serve as a single worker. Set by the supervisor when it re-executes itself.
    #[arg(long, hide = true)]
    worker: bool,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_body_bytes: self.max_body_bytes,
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
            reuse_port: true,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger_init(
        &LoggerConfig::new(cli.log_format, cli.log_level.as_str()).with_color(cli.log_color),
    )?;

    let server = cli.server_config();
    server.validate()?;

    // Both roles are single-threaded; parallelism comes from processes.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    if cli.worker {
        let slot = std::env::var(WORKER_SLOT_ENV).ok();
        info!(pid = std::process::id(), slot = slot.as_deref().unwrap_or("-"), "worker starting");
        rt.block_on(run_worker(&server))?;
        return Ok(());
    }

    rt.block_on(supervise(&cli, &server))
}

async fn supervise(cli: &Cli, server: &ServerConfig) -> anyhow::Result<()> {
    // 1) Fail fast on an address workers could never bind.
    let addr = server.socket_addr()?;

    // 2) Pool re-executing this binary in worker mode
    let cfg = PoolConfig {
        workers: cli.workers.unwrap_or_else(default_parallelism),
        stop_grace: server.shutdown_grace + Duration::from_secs(1),
        ..Default::default()
    };
    let command = WorkerCommand::current_exe()?
        .args(std::env::args_os().skip(1))
        .args(["--worker"]);
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(SupervisorEvents::new())];
    let pool = WorkerPool::new(cfg.clone(), command)?.with_subscribers(subscribers);
    info!(pid = std::process::id(), %addr, workers = cfg.workers, "supervisor ready");

    // 3) Signals stop the pool
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("stopping workers");
            cancel.cancel();
        }
    });

    pool.run(cancel).await?;
    Ok(())
}
