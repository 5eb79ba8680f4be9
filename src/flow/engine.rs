// SPDX-License-Identifier: MIT

//! Workflow engine: step sequencing, interrupt protocol, resume
//!
//! The "interrupt-before" suspension is a two-call protocol rather than
//! a blocking wait: [`Engine::start`] runs the automated steps and halts
//! unconditionally before the approval step, checkpointing the state;
//! [`Engine::submit_decision`] reloads the checkpoint, merges the human
//! decision, and drives the graph to a terminal step. No step suspends
//! mid-body; suspension is purely an inter-call boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::error::EngineError;
use super::nodes::{self, ProposalChooser, StepName};
use super::router;
use super::state::{Decision, Modification, StateUpdate, WorkflowState};
use super::store::CheckpointStore;
use crate::data::EmployeeSource;

/// Engine instance owning its store and collaborators.
///
/// Constructed explicitly (no process-wide singleton) so tests isolate
/// per instance.
pub struct Engine {
    store: Arc<dyn CheckpointStore>,
    source: Arc<dyn EmployeeSource>,
    chooser: Arc<dyn ProposalChooser>,
    /// Per-thread-id submit locks; of two racing submitters for one
    /// thread id, the loser observes `AlreadyCompleted`. Independent
    /// thread ids never contend.
    submit_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn CheckpointStore>,
        source: Arc<dyn EmployeeSource>,
        chooser: Arc<dyn ProposalChooser>,
    ) -> Self {
        Self {
            store,
            source,
            chooser,
            submit_locks: Mutex::new(HashMap::new()),
        }
    }

    fn submit_lock(&self, thread_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .submit_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(thread_id.to_string()).or_default())
    }

    /// Run a fresh workflow up to the interrupt boundary.
    ///
    /// Executes load_data and analyze_department, then halts before
    /// human_approval and persists. When the roster is empty, analyze
    /// reaches its terminal shortcut and the interrupt is skipped
    /// entirely; the persisted state is already final.
    pub fn start(&self, thread_id: &str, department: &str) -> Result<WorkflowState, EngineError> {
        if department.trim().is_empty() {
            return Err(EngineError::Validation(
                "department must not be empty".to_string(),
            ));
        }

        log::info!("Starting workflow {} for department {}", thread_id, department);

        let mut state = WorkflowState::new(department);
        for step in [StepName::LoadData, StepName::AnalyzeDepartment] {
            let update = self.run_step(step, &state);
            state.apply(update);
            if state.is_completed() {
                // Terminal reached early (no_data); nothing to review
                self.store.put(thread_id, state.clone())?;
                return Ok(state);
            }
        }

        // Interrupt-before: checkpoint and hand control back to the caller
        self.store.put(thread_id, state.clone())?;
        log::info!("Workflow {} paused before {}", thread_id, StepName::HumanApproval);
        Ok(state)
    }

    /// Resume a paused workflow with the human decision.
    ///
    /// Loads the checkpoint, merges the decision, executes the
    /// interrupted approval step, routes, and runs the selected resolver
    /// to completion. Errors abort before any write, leaving the stored
    /// checkpoint untouched.
    pub fn submit_decision(
        &self,
        thread_id: &str,
        decision: Decision,
        modification: Option<Modification>,
    ) -> Result<WorkflowState, EngineError> {
        let lock = self.submit_lock(thread_id);
        let _guard = lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut state = self
            .store
            .get(thread_id)?
            .ok_or_else(|| EngineError::NotFound(thread_id.to_string()))?;

        if state.is_completed() {
            return Err(EngineError::AlreadyCompleted(thread_id.to_string()));
        }

        log::info!("Resuming workflow {} with decision {:?}", thread_id, decision);

        state.apply(StateUpdate {
            human_decision: Some(decision),
            modification,
            ..Default::default()
        });

        // The interrupted step runs first on resume; its sole effect is
        // the "paused for review" log entry.
        let update = self.run_step(StepName::HumanApproval, &state);
        state.apply(update);

        let next = router::route(&state);
        if next == StepName::HumanApproval {
            // Defensive self-loop: re-enter the suspension boundary
            self.store.put(thread_id, state.clone())?;
            return Ok(state);
        }

        let update = self.run_step(next, &state);
        state.apply(update);

        self.store.put(thread_id, state.clone())?;
        log::info!("Workflow {} completed via {}", thread_id, next);
        Ok(state)
    }

    /// Latest checkpoint for a thread, for front-ends rendering status.
    pub fn state(&self, thread_id: &str) -> Result<WorkflowState, EngineError> {
        self.store
            .get(thread_id)?
            .ok_or_else(|| EngineError::NotFound(thread_id.to_string()))
    }

    /// All persisted snapshots for a thread, oldest first.
    pub fn history(&self, thread_id: &str) -> Result<Vec<WorkflowState>, EngineError> {
        Ok(self.store.history(thread_id)?)
    }

    fn run_step(&self, step: StepName, state: &WorkflowState) -> StateUpdate {
        log::debug!("Executing step: {}", step);
        match step {
            StepName::LoadData => nodes::load_data(state, self.source.as_ref()),
            StepName::AnalyzeDepartment => {
                nodes::analyze_department(state, self.chooser.as_ref())
            }
            StepName::HumanApproval => nodes::human_approval(state),
            StepName::ProcessApproval => nodes::process_approval(state),
            StepName::ProcessRejection => nodes::process_rejection(state),
            StepName::ProcessModification => nodes::process_modification(state),
        }
    }
}
