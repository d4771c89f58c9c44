use serde::Serialize;

/// Liveness of a worker process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerState {
    /// Process is alive and serving.
    Running,
    /// Process has exited; a replacement is pending.
    Exited,
}

impl WorkerState {
    pub fn is_running(&self) -> bool {
        matches!(self, WorkerState::Running)
    }
}

/// Supervisor-side view of one worker slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    /// Slot index in `0..N`.
    pub slot: usize,
    /// OS process id of the current (or last) process in this slot.
    pub pid: u32,
    pub state: WorkerState,
    /// Replacements spawned for this slot since the pool started.
    pub restarts: u32,
}

impl WorkerRecord {
    pub fn running(slot: usize, pid: u32) -> Self {
        Self {
            slot,
            pid,
            state: WorkerState::Running,
            restarts: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_running() {
        let rec = WorkerRecord::running(3, 4242);
        assert!(rec.state.is_running());
        assert_eq!(rec.restarts, 0);
        assert!(!WorkerState::Exited.is_running());
    }

    #[test]
    fn serde_camel_case() {
        let rec = WorkerRecord::running(0, 1);
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains(r#""state":"running""#));
    }
}
