// SPDX-License-Identifier: MIT

//! Typed error handling for the workflow engine
//!
//! Step-local anomalies (empty roster, missing modification key) are
//! absorbed into the state via terminal or fallback updates and never
//! surface here; these variants cover only engine-level failures.

use thiserror::Error;

/// Errors raised by the engine entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed initial input (e.g. missing department)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No checkpoint exists for the thread id
    #[error("No workflow found for thread '{0}'")]
    NotFound(String),

    /// Decision submitted for a thread that already reached a terminal state
    #[error("Workflow for thread '{0}' is already completed")]
    AlreadyCompleted(String),

    /// Persistence layer failure
    #[error("State store failure: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by a checkpoint store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or corrupted
    #[error("Checkpoint backend unavailable: {0}")]
    Unavailable(String),
}
