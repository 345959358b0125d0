use serde::{Deserialize, Serialize};

/// Durable cursor into the workshop mutation stream. Persisted after each
/// processed event and read on startup so the observer resumes without gaps.
/// Re-processing the events between the checkpoint and a crash is safe: the
/// ledger claim absorbs duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCheckpoint {
    pub name: String,
    pub token: String,
    pub updated: i64,
}

impl StreamCheckpoint {
    /// Checkpoint name used by the single workshop observer.
    pub const OBSERVER: &'static str = "workshop-observer";

    pub fn new(name: &str, token: String, now_millis: i64) -> Self {
        Self {
            name: name.to_string(),
            token,
            updated: now_millis,
        }
    }
}
