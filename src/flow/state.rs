// SPDX-License-Identifier: MIT

//! Workflow state schema and partial-update merging
//!
//! `WorkflowState` is the only persisted entity. Steps never mutate it
//! directly; each returns a [`StateUpdate`] covering only the fields it
//! owns, and the engine merges updates field-by-field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable employee snapshot sourced from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub department: String,
    pub position: String,
    /// Salary in whole currency units.
    pub current_salary: u64,
    pub manager: String,
    pub join_date: NaiveDate,
}

/// Generated change proposal awaiting human review.
///
/// The serde tag doubles as the proposal type on the wire
/// (`salary_hike` / `manager_change`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Proposal {
    SalaryHike {
        employee_id: u64,
        employee_name: String,
        current_salary: u64,
        proposed_salary: u64,
        increase_percentage: u32,
        reason: String,
    },
    ManagerChange {
        employee_id: u64,
        employee_name: String,
        current_manager: String,
        proposed_manager: String,
        reason: String,
    },
}

impl Proposal {
    /// Name of the employee the proposal concerns.
    pub fn employee_name(&self) -> &str {
        match self {
            Proposal::SalaryHike { employee_name, .. } => employee_name,
            Proposal::ManagerChange { employee_name, .. } => employee_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Proposal::SalaryHike { .. } => "salary_hike",
            Proposal::ManagerChange { .. } => "manager_change",
        }
    }
}

/// Human verdict on a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
    Modify,
}

/// Overrides supplied alongside a `modify` decision.
///
/// Only the field matching the proposal kind is consulted; a missing
/// field falls back to the originally proposed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Modification {
    pub modified_salary: Option<u64>,
    pub modified_manager: Option<String>,
}

/// Terminal workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Approved,
    Rejected,
    Modified,
    NoData,
}

/// Terminal result: status and human-readable summary, always set together.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Outcome {
    pub status: FinalStatus,
    pub message: String,
}

/// Full workflow state, checkpointed under a thread id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowState {
    pub department: String,
    #[serde(default)]
    pub employees: Vec<Employee>,
    pub highest_paid: Option<Employee>,
    pub proposal: Option<Proposal>,
    pub human_decision: Option<Decision>,
    pub modification: Option<Modification>,
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub execution_log: Vec<String>,
}

impl WorkflowState {
    /// Fresh state for a department, before any step has run.
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            employees: Vec::new(),
            highest_paid: None,
            proposal: None,
            human_decision: None,
            modification: None,
            outcome: None,
            execution_log: Vec::new(),
        }
    }

    /// Whether a terminal step has run.
    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Merge a partial update, field-level overwrite.
    ///
    /// Steps own disjoint fields, so overwrite never conflicts; the log
    /// entry is appended after the field merge to preserve append order.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(employees) = update.employees {
            self.employees = employees;
        }
        if let Some(highest_paid) = update.highest_paid {
            self.highest_paid = Some(highest_paid);
        }
        if let Some(proposal) = update.proposal {
            self.proposal = Some(proposal);
        }
        if let Some(decision) = update.human_decision {
            self.human_decision = Some(decision);
        }
        if let Some(modification) = update.modification {
            self.modification = Some(modification);
        }
        if let Some(outcome) = update.outcome {
            self.outcome = Some(outcome);
        }
        if let Some(entry) = update.log_entry {
            self.execution_log.push(entry);
        }
    }
}

/// Partial update returned by a step: only the fields the step changes.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub employees: Option<Vec<Employee>>,
    pub highest_paid: Option<Employee>,
    pub proposal: Option<Proposal>,
    pub human_decision: Option<Decision>,
    pub modification: Option<Modification>,
    pub outcome: Option<Outcome>,
    pub log_entry: Option<String>,
}

impl StateUpdate {
    /// Update carrying only a log entry.
    pub fn log(entry: impl Into<String>) -> Self {
        Self {
            log_entry: Some(entry.into()),
            ..Default::default()
        }
    }
}
