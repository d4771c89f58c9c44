//! Logs the worker supervisor's lifecycle events.

use async_trait::async_trait;
use taskvisor::{Event, EventKind, Subscribe};
use tracing::{debug, error, info, trace, warn};

/// `taskvisor` subscriber that turns supervisor events into `tracing` records.
///
/// Task names are worker slots (`worker-<n>`), so every record carries `task`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SupervisorEvents;

impl SupervisorEvents {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for SupervisorEvents {
    async fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "wirebench-supervisor-events"
    }

    fn queue_capacity(&self) -> usize {
        1024
    }
}

fn log_event(e: &Event) {
    let task = e.task.as_deref().unwrap_or("-");
    let reason = e.reason.as_deref().unwrap_or("-");
    let attempt = e.attempt.unwrap_or(0);

    match e.kind {
        EventKind::TaskStarting => debug!(task, attempt, "attempt starting"),
        EventKind::TaskFailed => warn!(task, attempt, reason, "attempt failed"),
        EventKind::BackoffScheduled => info!(
            task,
            attempt,
            delay_ms = e.delay_ms.unwrap_or(0),
            "replacement scheduled"
        ),
        EventKind::ActorDead | EventKind::ActorExhausted => {
            error!(task, reason, "slot abandoned; no further restarts")
        }
        EventKind::ShutdownRequested => info!("supervisor shutting down"),
        EventKind::GraceExceeded => warn!("workers outlived the stop grace"),
        EventKind::AllStoppedWithinGrace => info!("all workers stopped"),
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
            error!(task, reason, "supervisor event lost")
        }
        kind => trace!(task, ?kind, "supervisor event"),
    }
}
