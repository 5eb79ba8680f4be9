// SPDX-License-Identifier: MIT

//! Checkpoint storage keyed by thread id
//!
//! The store holds the latest state snapshot per thread, plus the full
//! version history behind it. Guarantees are per key only: a `put` is
//! visible to any subsequent `get` for the same key; there is no
//! cross-key ordering.

use std::collections::HashMap;
use std::sync::RwLock;

use super::error::StoreError;
use super::state::WorkflowState;

/// Keyed checkpoint storage for workflow state.
pub trait CheckpointStore: Send + Sync {
    /// Latest snapshot for a thread, if any.
    fn get(&self, thread_id: &str) -> Result<Option<WorkflowState>, StoreError>;

    /// Persist a new snapshot for a thread, appending to its history.
    fn put(&self, thread_id: &str, state: WorkflowState) -> Result<(), StoreError>;

    /// All snapshots persisted for a thread, oldest first.
    fn history(&self, thread_id: &str) -> Result<Vec<WorkflowState>, StoreError>;
}

/// In-process store; checkpoints live for the process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    checkpoints: RwLock<HashMap<String, Vec<WorkflowState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryStore {
    fn get(&self, thread_id: &str) -> Result<Option<WorkflowState>, StoreError> {
        let checkpoints = self
            .checkpoints
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(checkpoints
            .get(thread_id)
            .and_then(|versions| versions.last())
            .cloned())
    }

    fn put(&self, thread_id: &str, state: WorkflowState) -> Result<(), StoreError> {
        let mut checkpoints = self
            .checkpoints
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        checkpoints
            .entry(thread_id.to_string())
            .or_default()
            .push(state);
        Ok(())
    }

    fn history(&self, thread_id: &str) -> Result<Vec<WorkflowState>, StoreError> {
        let checkpoints = self
            .checkpoints
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(checkpoints.get(thread_id).cloned().unwrap_or_default())
    }
}
