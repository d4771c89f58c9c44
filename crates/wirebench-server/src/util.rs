use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, warn};

/// Ask a process to terminate.
#[cfg(unix)]
pub(crate) fn send_terminate(pid: u32) {
    use nix::{
        sys::signal::{Signal, kill},
        unistd::Pid,
    };

    if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        debug!(pid, error = %e, "SIGTERM not delivered");
    }
}

#[cfg(not(unix))]
pub(crate) fn send_terminate(_pid: u32) {}

/// SIGTERM the child, wait up to `grace`, then SIGKILL.
pub(crate) async fn stop_child(child: &mut Child, grace: Duration) {
    let Some(pid) = child.id() else {
        // Already reaped.
        return;
    };

    send_terminate(pid);
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => debug!(pid, %status, "worker stopped"),
        Ok(Err(e)) => warn!(pid, error = %e, "wait on stopping worker failed"),
        Err(_) => {
            warn!(pid, grace_ms = grace.as_millis() as u64, "worker ignored SIGTERM; killing");
            if let Err(e) = child.kill().await {
                warn!(pid, error = %e, "kill failed");
            }
        }
    }
}
