use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use taskvisor::{TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    PoolError,
    pool::{WorkerCommand, WorkerRegistry},
    util::stop_child,
};

/// Everything one slot's task needs; cloned into every attempt.
#[derive(Clone)]
pub(crate) struct SlotTask {
    pub slot: usize,
    pub command: Arc<WorkerCommand>,
    pub registry: WorkerRegistry,
    pub stable_after: Duration,
    pub stop_grace: Duration,
    /// Pool-wide stop, independent of the supervisor's own token.
    pub cancel: CancellationToken,
}

impl SlotTask {
    /// One attempt = one worker process, from spawn to exit.
    ///
    /// A run shorter than `stable_after` is a failure, so the supervisor backs off
    /// before the next attempt. A stable run ends `Ok` and is replaced at once.
    pub fn into_task(self) -> TaskRef {
        // Task names must be 'static; one leak per slot for the pool's lifetime.
        let name: &'static str = Box::leak(format!("worker-{}", self.slot).into_boxed_str());

        TaskFn::arc(name, move |ctx: CancellationToken| {
            let this = self.clone();
            async move { this.attempt(ctx).await }
        })
    }

    async fn attempt(self, ctx: CancellationToken) -> Result<(), TaskError> {
        let slot = self.slot;
        if ctx.is_cancelled() || self.cancel.is_cancelled() {
            return Err(TaskError::Canceled);
        }

        let mut child = self.command.spawn(slot).map_err(|e| TaskError::Fail {
            reason: e.to_string(),
        })?;
        let pid = child.id().unwrap_or_default();
        self.registry.started(slot, pid);
        info!(slot, pid, "worker started");
        let started = Instant::now();

        tokio::select! {
            status = child.wait() => {
                self.registry.exited(slot);
                let uptime = started.elapsed();
                let status = status.map_err(|source| TaskError::Fail {
                    reason: PoolError::Wait { slot, source }.to_string(),
                })?;
                warn!(slot, pid, %status, uptime_ms = uptime.as_millis() as u64, "worker exited; replacing");

                if uptime >= self.stable_after {
                    Ok(())
                } else {
                    Err(TaskError::Fail {
                        reason: format!("worker {slot} exited after {}ms: {status}", uptime.as_millis()),
                    })
                }
            }
            _ = stopped(&ctx, &self.cancel) => {
                debug!(slot, pid, "stopping worker");
                stop_child(&mut child, self.stop_grace).await;
                self.registry.exited(slot);
                info!(slot, pid, "worker stopped");
                Err(TaskError::Canceled)
            }
        }
    }
}

async fn stopped(a: &CancellationToken, b: &CancellationToken) {
    tokio::select! {
        _ = a.cancelled() => {}
        _ = b.cancelled() => {}
    }
}
