//! Supervisor that keeps `N` worker processes alive.
//!
//! Every slot is a `taskvisor` task that owns one worker process per attempt. The
//! supervisor restarts it whenever it ends and spaces rapid failures with
//! [`BackoffPolicy`]. Cancellation stops every worker (SIGTERM, then SIGKILL
//! after the stop grace) and ends the tasks.

use std::{sync::Arc, time::Duration};

use taskvisor::{
    BackoffPolicy, SupervisorConfig, RestartPolicy, Subscribe, Supervisor, TaskSpec,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{PoolError, default_parallelism};

mod command;
pub use command::{WORKER_SLOT_ENV, WorkerCommand};
mod registry;
pub use registry::WorkerRegistry;
mod task;
use task::SlotTask;

/// Pool sizing and lifecycle settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub workers: usize,
    /// Delay between consecutive rapid failures of one slot.
    pub backoff: BackoffPolicy,
    /// A worker that ran at least this long is replaced without delay.
    pub stable_after: Duration,
    /// How long a worker may take to exit after SIGTERM before it is killed.
    pub stop_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_parallelism(),
            backoff: BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_secs(10),
                factor: 2.0,
                ..BackoffPolicy::default()
            },
            stable_after: Duration::from_secs(5),
            stop_grace: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("workers must be >= 1".into()));
        }
        if !self.backoff.factor.is_finite() || self.backoff.factor < 1.0 {
            return Err(PoolError::InvalidConfig(format!(
                "backoff factor must be >= 1.0, got {}",
                self.backoff.factor
            )));
        }
        if self.backoff.first > self.backoff.max {
            return Err(PoolError::InvalidConfig(
                "backoff first delay exceeds max".into(),
            ));
        }
        Ok(())
    }
}

pub struct WorkerPool {
    cfg: PoolConfig,
    command: Arc<WorkerCommand>,
    registry: WorkerRegistry,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl WorkerPool {
    pub fn new(cfg: PoolConfig, command: WorkerCommand) -> Result<Self, PoolError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            command: Arc::new(command),
            registry: WorkerRegistry::new(),
            subscribers: Vec::new(),
        })
    }

    /// Receive the supervisor's lifecycle events (starts, failures, backoff).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Live view of the slots; stays valid after `run` returns.
    pub fn registry(&self) -> WorkerRegistry {
        self.registry.clone()
    }

    /// Start all workers and keep them alive until `cancel` fires.
    ///
    /// Returns once every worker has been stopped.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), PoolError> {
        info!(
            workers = self.cfg.workers,
            program = %self.command.program.display(),
            "starting worker pool"
        );

        let mut sup_cfg = SupervisorConfig::default();
        sup_cfg.grace = self.cfg.stop_grace + Duration::from_secs(1);
        let sup = Supervisor::builder(sup_cfg)
            .with_subscribers(self.subscribers.clone())
            .build();

        let specs: Vec<TaskSpec> = (0..self.cfg.workers)
            .map(|slot| {
                let task = SlotTask {
                    slot,
                    command: Arc::clone(&self.command),
                    registry: self.registry.clone(),
                    stable_after: self.cfg.stable_after,
                    stop_grace: self.cfg.stop_grace,
                    cancel: cancel.clone(),
                }
                .into_task();
                TaskSpec::new(
                    task,
                    RestartPolicy::Always { interval: None },
                    self.cfg.backoff.clone(),
                    None,
                )
            })
            .collect();

        let run = sup.run(specs);
        tokio::pin!(run);

        let res = tokio::select! {
            res = &mut run => res,
            _ = cancel.cancelled() => {
                // Tasks see the same token; a slot sleeping in backoff notices on its next attempt.
                let wind_down = self.cfg.stop_grace + self.cfg.backoff.max;
                match tokio::time::timeout(wind_down, &mut run).await {
                    Ok(res) => res,
                    Err(_) => {
                        warn!(wind_down_ms = wind_down.as_millis() as u64, "supervisor still running after stop; leaving it");
                        Ok(())
                    }
                }
            }
        };
        res.map_err(|e| PoolError::Supervisor(e.to_string()))?;

        info!(restarts = self.registry.total_restarts(), "worker pool stopped");
        Ok(())
    }
}
