//! Outcome model: what happened to one invocation.
//!
//! `TaskRunner::execute` never returns an error. Instead it hands back an
//! `InvocationReport` describing how far the invocation got and whether the
//! result reached its destination. The delivered `TaskResult` stays the
//! primary output; this report exists for callers and tests that want to
//! observe the path taken without parsing the task log.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the task part of an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationStatus {
    /// Run finished within the deadline.
    Completed,
    /// Entity missing or of a type the task does not accept; Run skipped.
    BrokenInput,
    /// Option coercion failed; Run skipped.
    SetupFailed,
    /// Run returned an error or panicked.
    RunFailed,
    /// Run exceeded the deadline and was abandoned.
    TimedOut,
}

/// Where a result ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Delivered {
    /// POSTed to a webhook; HTTP status code.
    Posted(u16),
    /// Written to a file.
    Written(PathBuf),
    /// Handler type without a delivery channel; nothing persisted.
    Discarded(String),
    /// Delivery was attempted and failed. The error was logged and dropped.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationReport {
    pub status: InvocationStatus,
    pub delivery: Delivered,
    /// Number of unique entities in the delivered result.
    pub entity_count: usize,
    /// Whether Cleanup was called (it is skipped for broken input).
    pub cleaned_up: bool,
}

impl InvocationReport {
    pub fn delivered(&self) -> bool {
        !matches!(self.delivery, Delivered::Failed(_))
    }
}
