//! Error taxonomy for task selection.
//!
//! None of these reach the simulation's end user: `TaskUnavailable` and
//! `ScoringFault` are absorbed by the selector, `NoCandidates` turns into the
//! idle fallback. Only `RegistryError` surfaces, to tooling.

use crate::slot::SlotKey;

/// A resource assumed available while scoring vanished before the task could
/// be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task '{task}' unavailable: {reason}")]
pub struct TaskUnavailable {
    pub task: String,
    pub reason: String,
}

impl TaskUnavailable {
    pub fn new(task: &str, reason: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            reason: reason.into(),
        }
    }
}

/// A scorer hit an inconsistent state. The task counts as weight 0 for the
/// current pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scoring '{task}' failed: {reason}")]
pub struct ScoringFault {
    pub task: String,
    pub reason: String,
}

impl ScoringFault {
    pub fn new(task: &str, reason: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            reason: reason.into(),
        }
    }
}

/// Catalog lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("task '{0}' not found")]
    TaskNotFound(String),
}

/// Explicit claim/release failures on a shared resource slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot is full or reserved")]
    Full,
    #[error("slot has no outstanding claim")]
    NotClaimed,
    #[error("unknown slot {0:?}")]
    Unknown(SlotKey),
}

/// Tuning could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Internal selector signal, converted into the idle fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum SelectError {
    #[error("no positive-weight candidates")]
    NoCandidates,
}
