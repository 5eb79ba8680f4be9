// SPDX-License-Identifier: MIT

//! Workflow step functions
//!
//! Each step is a pure mapping from the current state (plus an injected
//! collaborator where needed) to a [`StateUpdate`] covering only the
//! fields it owns. Every step appends exactly one execution log entry.
//! Data anomalies degrade into terminal or fallback updates instead of
//! errors, so the workflow always reaches a well-formed terminal state.

use std::fmt;

use rand::Rng;

use super::state::{
    Decision, Employee, FinalStatus, Outcome, Proposal, StateUpdate, WorkflowState,
};
use crate::data::EmployeeSource;

/// Salary hike percentage applied to generated proposals.
const HIKE_PERCENTAGE: u32 = 15;

/// Names of the registered workflow steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepName {
    LoadData,
    AnalyzeDepartment,
    HumanApproval,
    ProcessApproval,
    ProcessRejection,
    ProcessModification,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::LoadData => "load_data",
            StepName::AnalyzeDepartment => "analyze_department",
            StepName::HumanApproval => "human_approval",
            StepName::ProcessApproval => "process_approval",
            StepName::ProcessRejection => "process_rejection",
            StepName::ProcessModification => "process_modification",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two proposal shapes to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalKind {
    SalaryHike,
    ManagerChange,
}

/// Injectable randomness for proposal generation.
///
/// The production chooser draws uniformly; tests pin outcomes with
/// fixed implementations.
pub trait ProposalChooser: Send + Sync {
    /// Pick which proposal shape to generate.
    fn pick_kind(&self) -> ProposalKind;

    /// Pick an index in `0..len`. `len` is always non-zero.
    fn pick_index(&self, len: usize) -> usize;
}

/// Uniformly random chooser backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct RandomChooser;

impl ProposalChooser for RandomChooser {
    fn pick_kind(&self) -> ProposalKind {
        if rand::thread_rng().gen_bool(0.5) {
            ProposalKind::SalaryHike
        } else {
            ProposalKind::ManagerChange
        }
    }

    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// First-occurrence arg-max by salary. Strict comparison keeps the
/// earliest element on ties, which callers rely on for determinism.
fn highest_paid(employees: &[Employee]) -> Option<&Employee> {
    let mut best: Option<&Employee> = None;
    for employee in employees {
        match best {
            Some(current) if employee.current_salary <= current.current_salary => {}
            _ => best = Some(employee),
        }
    }
    best
}

fn hiked_salary(current: u64) -> u64 {
    match current.checked_mul(100 + HIKE_PERCENTAGE as u64) {
        Some(scaled) => scaled / 100,
        // Salaries past u64::MAX / 115: split into whole hundreds and
        // remainder so the floor stays exact, saturating at the top.
        None => {
            let hike = (current / 100)
                .saturating_mul(HIKE_PERCENTAGE as u64)
                .saturating_add(current % 100 * HIKE_PERCENTAGE as u64 / 100);
            current.saturating_add(hike)
        }
    }
}

/// Fetch the department roster into the state.
pub fn load_data(state: &WorkflowState, source: &dyn EmployeeSource) -> StateUpdate {
    log::info!("[load_data] loading roster for department: {}", state.department);

    let employees = source.employees_of(&state.department);
    let log_entry = format!(
        "Loaded {} employees from {} department",
        employees.len(),
        state.department
    );

    StateUpdate {
        employees: Some(employees),
        log_entry: Some(log_entry),
        ..Default::default()
    }
}

/// Identify the highest-paid employee and generate a proposal.
///
/// An empty roster short-circuits to a `no_data` terminal outcome.
pub fn analyze_department(state: &WorkflowState, chooser: &dyn ProposalChooser) -> StateUpdate {
    log::info!("[analyze_department] analyzing {} employees", state.employees.len());

    let Some(top) = highest_paid(&state.employees) else {
        return StateUpdate {
            outcome: Some(Outcome {
                status: FinalStatus::NoData,
                message: "No employees found in this department".to_string(),
            }),
            log_entry: Some("No employees found".to_string()),
            ..Default::default()
        };
    };

    let mut kind = chooser.pick_kind();
    let others: Vec<&Employee> = state.employees.iter().filter(|e| e.id != top.id).collect();
    if kind == ProposalKind::ManagerChange && others.is_empty() {
        // Nobody else to promote into the manager seat
        kind = ProposalKind::SalaryHike;
    }

    let proposal = match kind {
        ProposalKind::SalaryHike => Proposal::SalaryHike {
            employee_id: top.id,
            employee_name: top.name.clone(),
            current_salary: top.current_salary,
            proposed_salary: hiked_salary(top.current_salary),
            increase_percentage: HIKE_PERCENTAGE,
            reason: format!("Top performer in {} department", state.department),
        },
        ProposalKind::ManagerChange => {
            let new_manager = others[chooser.pick_index(others.len())];
            Proposal::ManagerChange {
                employee_id: top.id,
                employee_name: top.name.clone(),
                current_manager: top.manager.clone(),
                proposed_manager: new_manager.name.clone(),
                reason: format!(
                    "Reassignment for better team dynamics in {}",
                    state.department
                ),
            }
        }
    };

    let log_entry = format!(
        "Identified highest-paid: {} ({}). Proposal: {}",
        top.name,
        top.current_salary,
        proposal.kind()
    );

    StateUpdate {
        highest_paid: Some(top.clone()),
        proposal: Some(proposal),
        log_entry: Some(log_entry),
        ..Default::default()
    }
}

/// Interrupt marker: no business logic, just the suspension boundary
/// the engine halts before.
pub fn human_approval(_state: &WorkflowState) -> StateUpdate {
    log::info!("[human_approval] workflow paused for review");
    StateUpdate::log("Workflow paused for human review")
}

/// Accept the proposal verbatim.
pub fn process_approval(state: &WorkflowState) -> StateUpdate {
    log::info!("[process_approval] accepting proposal");

    let Some(proposal) = &state.proposal else {
        return missing_proposal(FinalStatus::Approved);
    };

    let message = match proposal {
        Proposal::SalaryHike {
            employee_name,
            current_salary,
            proposed_salary,
            ..
        } => format!(
            "APPROVED: Salary hike for {} from {} to {}",
            employee_name, current_salary, proposed_salary
        ),
        Proposal::ManagerChange {
            employee_name,
            current_manager,
            proposed_manager,
            ..
        } => format!(
            "APPROVED: Manager change for {} from {} to {}",
            employee_name, current_manager, proposed_manager
        ),
    };

    StateUpdate {
        outcome: Some(Outcome {
            status: FinalStatus::Approved,
            message,
        }),
        log_entry: Some(format!(
            "Proposal approved: {} for {}",
            proposal.kind(),
            proposal.employee_name()
        )),
        ..Default::default()
    }
}

/// Discard the proposal; nothing is applied.
pub fn process_rejection(state: &WorkflowState) -> StateUpdate {
    log::info!("[process_rejection] rejecting proposal");

    let Some(proposal) = &state.proposal else {
        return missing_proposal(FinalStatus::Rejected);
    };

    let name = proposal.employee_name();
    StateUpdate {
        outcome: Some(Outcome {
            status: FinalStatus::Rejected,
            message: format!("REJECTED: Proposal for {} was rejected", name),
        }),
        log_entry: Some(format!("Proposal rejected for {}", name)),
        ..Default::default()
    }
}

/// Apply the human-supplied value in place of the proposed one.
///
/// A missing modification key for the proposal's shape falls back to the
/// originally proposed value; this is deliberate policy, not data loss.
pub fn process_modification(state: &WorkflowState) -> StateUpdate {
    log::info!("[process_modification] applying human modification");

    let Some(proposal) = &state.proposal else {
        return missing_proposal(FinalStatus::Modified);
    };

    let (message, log_entry) = match proposal {
        Proposal::SalaryHike {
            employee_name,
            current_salary,
            proposed_salary,
            ..
        } => {
            let modified = state
                .modification
                .as_ref()
                .and_then(|m| m.modified_salary)
                .unwrap_or_else(|| {
                    log::warn!("modified_salary missing, keeping proposed value");
                    *proposed_salary
                });
            (
                format!(
                    "MODIFIED: Salary hike for {} from {} to {} (originally proposed: {})",
                    employee_name, current_salary, modified, proposed_salary
                ),
                format!("Proposal modified: salary changed to {}", modified),
            )
        }
        Proposal::ManagerChange {
            employee_name,
            proposed_manager,
            ..
        } => {
            let modified = state
                .modification
                .as_ref()
                .and_then(|m| m.modified_manager.clone())
                .unwrap_or_else(|| {
                    log::warn!("modified_manager missing, keeping proposed value");
                    proposed_manager.clone()
                });
            (
                format!(
                    "MODIFIED: Manager change for {} to {} (originally proposed: {})",
                    employee_name, modified, proposed_manager
                ),
                format!("Proposal modified: manager changed to {}", modified),
            )
        }
    };

    StateUpdate {
        outcome: Some(Outcome {
            status: FinalStatus::Modified,
            message,
        }),
        log_entry: Some(log_entry),
        ..Default::default()
    }
}

// Resolvers are only reachable after analyze has set a proposal; this
// keeps them total without panicking if that ever changes.
fn missing_proposal(status: FinalStatus) -> StateUpdate {
    log::warn!("resolver invoked without a proposal on record");
    StateUpdate {
        outcome: Some(Outcome {
            status,
            message: "No proposal on record".to_string(),
        }),
        log_entry: Some("No proposal on record".to_string()),
        ..Default::default()
    }
}

/// Resolver step for a decision, if the decision has one.
pub fn resolver_for(decision: Decision) -> StepName {
    match decision {
        Decision::Approve => StepName::ProcessApproval,
        Decision::Reject => StepName::ProcessRejection,
        Decision::Modify => StepName::ProcessModification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Roster;
    use crate::flow::state::Modification;
    use chrono::NaiveDate;

    /// Chooser pinned to fixed outcomes.
    pub(crate) struct FixedChooser {
        pub kind: ProposalKind,
        pub index: usize,
    }

    impl ProposalChooser for FixedChooser {
        fn pick_kind(&self) -> ProposalKind {
            self.kind
        }

        fn pick_index(&self, len: usize) -> usize {
            self.index.min(len - 1)
        }
    }

    fn employee(id: u64, name: &str, salary: u64) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            department: "Engineering".to_string(),
            position: "Engineer".to_string(),
            current_salary: salary,
            manager: "Dana Iyer".to_string(),
            join_date: NaiveDate::from_ymd_opt(2020, 5, 4).unwrap(),
        }
    }

    fn state_with(employees: Vec<Employee>) -> WorkflowState {
        let mut state = WorkflowState::new("Engineering");
        state.employees = employees;
        state
    }

    #[test]
    fn test_load_data_records_count() {
        let roster = Roster::from_employees(vec![
            employee(1, "Asha", 100),
            employee(2, "Ben", 90),
        ]);
        let state = WorkflowState::new("Engineering");

        let update = load_data(&state, &roster);

        assert_eq!(update.employees.as_ref().unwrap().len(), 2);
        assert_eq!(
            update.log_entry.unwrap(),
            "Loaded 2 employees from Engineering department"
        );
    }

    #[test]
    fn test_highest_paid_ties_resolve_to_first() {
        let employees = vec![
            employee(1, "Asha", 500),
            employee(2, "Ben", 500),
            employee(3, "Carla", 300),
        ];
        let top = highest_paid(&employees).unwrap();
        assert_eq!(top.id, 1);
    }

    #[test]
    fn test_highest_paid_maximal() {
        let employees = vec![
            employee(1, "Asha", 300),
            employee(2, "Ben", 900),
            employee(3, "Carla", 700),
        ];
        let top = highest_paid(&employees).unwrap();
        for e in &employees {
            assert!(top.current_salary >= e.current_salary);
        }
        assert_eq!(top.id, 2);
    }

    #[test]
    fn test_analyze_empty_roster_is_terminal() {
        let state = state_with(vec![]);
        let chooser = FixedChooser {
            kind: ProposalKind::SalaryHike,
            index: 0,
        };

        let update = analyze_department(&state, &chooser);

        let outcome = update.outcome.unwrap();
        assert_eq!(outcome.status, FinalStatus::NoData);
        assert_eq!(update.log_entry.unwrap(), "No employees found");
        assert!(update.highest_paid.is_none());
        assert!(update.proposal.is_none());
    }

    #[test]
    fn test_analyze_salary_hike_is_fifteen_percent_floor() {
        let state = state_with(vec![employee(1, "Asha", 101)]);
        let chooser = FixedChooser {
            kind: ProposalKind::SalaryHike,
            index: 0,
        };

        let update = analyze_department(&state, &chooser);

        match update.proposal.unwrap() {
            Proposal::SalaryHike {
                proposed_salary,
                increase_percentage,
                ..
            } => {
                // floor(101 * 1.15) = 116
                assert_eq!(proposed_salary, 116);
                assert_eq!(increase_percentage, 15);
            }
            other => panic!("expected salary hike, got {:?}", other),
        }
    }

    #[test]
    fn test_hiked_salary_survives_huge_values() {
        // 2e18 * 115 overflows u64, so this exercises the split path;
        // floor(2_000_000_000_000_000_007 * 1.15) = 2_300_000_000_000_000_008
        assert_eq!(
            hiked_salary(2_000_000_000_000_000_007),
            2_300_000_000_000_000_008
        );
        // Saturates instead of wrapping at the very top
        assert_eq!(hiked_salary(u64::MAX), u64::MAX);
        // The ordinary path is unchanged
        assert_eq!(hiked_salary(100), 115);
        assert_eq!(hiked_salary(101), 116);
    }

    #[test]
    fn test_analyze_step_total_on_huge_salary() {
        let state = state_with(vec![employee(1, "Asha", u64::MAX)]);
        let chooser = FixedChooser {
            kind: ProposalKind::SalaryHike,
            index: 0,
        };

        let update = analyze_department(&state, &chooser);

        match update.proposal.unwrap() {
            Proposal::SalaryHike {
                proposed_salary, ..
            } => assert_eq!(proposed_salary, u64::MAX),
            other => panic!("expected salary hike, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_manager_change_picks_other_employee() {
        let state = state_with(vec![
            employee(1, "Asha", 900),
            employee(2, "Ben", 300),
            employee(3, "Carla", 400),
        ]);
        let chooser = FixedChooser {
            kind: ProposalKind::ManagerChange,
            index: 1,
        };

        let update = analyze_department(&state, &chooser);

        match update.proposal.unwrap() {
            Proposal::ManagerChange {
                employee_name,
                current_manager,
                proposed_manager,
                ..
            } => {
                assert_eq!(employee_name, "Asha");
                assert_eq!(current_manager, "Dana Iyer");
                // Index 1 among the non-top employees [Ben, Carla]
                assert_eq!(proposed_manager, "Carla");
            }
            other => panic!("expected manager change, got {:?}", other),
        }
    }

    #[test]
    fn test_manager_change_falls_back_when_alone() {
        let state = state_with(vec![employee(1, "Asha", 900)]);
        let chooser = FixedChooser {
            kind: ProposalKind::ManagerChange,
            index: 0,
        };

        let update = analyze_department(&state, &chooser);

        assert!(matches!(
            update.proposal.unwrap(),
            Proposal::SalaryHike { .. }
        ));
    }

    #[test]
    fn test_human_approval_logs_only() {
        let state = state_with(vec![employee(1, "Asha", 100)]);
        let update = human_approval(&state);

        assert_eq!(update.log_entry.unwrap(), "Workflow paused for human review");
        assert!(update.outcome.is_none());
        assert!(update.proposal.is_none());
        assert!(update.employees.is_none());
    }

    #[test]
    fn test_approval_restates_proposal_verbatim() {
        let mut state = state_with(vec![employee(1, "Asha", 100)]);
        state.proposal = Some(Proposal::SalaryHike {
            employee_id: 1,
            employee_name: "Asha".to_string(),
            current_salary: 100,
            proposed_salary: 115,
            increase_percentage: 15,
            reason: "Top performer in Engineering department".to_string(),
        });

        let update = process_approval(&state);

        let outcome = update.outcome.unwrap();
        assert_eq!(outcome.status, FinalStatus::Approved);
        assert_eq!(outcome.message, "APPROVED: Salary hike for Asha from 100 to 115");
    }

    #[test]
    fn test_rejection_names_employee_and_applies_nothing() {
        let original = Proposal::ManagerChange {
            employee_id: 1,
            employee_name: "Asha".to_string(),
            current_manager: "Dana Iyer".to_string(),
            proposed_manager: "Ben".to_string(),
            reason: "Reassignment for better team dynamics in Engineering".to_string(),
        };
        let mut state = state_with(vec![employee(1, "Asha", 100)]);
        state.proposal = Some(original.clone());

        let update = process_rejection(&state);

        let outcome = update.outcome.unwrap();
        assert_eq!(outcome.status, FinalStatus::Rejected);
        assert!(outcome.message.contains("Asha"));
        // The proposal itself is untouched by rejection
        assert!(update.proposal.is_none());
        assert_eq!(state.proposal.unwrap(), original);
    }

    #[test]
    fn test_modification_applies_supplied_salary() {
        let mut state = state_with(vec![employee(1, "Asha", 100)]);
        state.proposal = Some(Proposal::SalaryHike {
            employee_id: 1,
            employee_name: "Asha".to_string(),
            current_salary: 100,
            proposed_salary: 115,
            increase_percentage: 15,
            reason: "Top performer in Engineering department".to_string(),
        });
        state.human_decision = Some(Decision::Modify);
        state.modification = Some(Modification {
            modified_salary: Some(120),
            modified_manager: None,
        });

        let update = process_modification(&state);

        let outcome = update.outcome.unwrap();
        assert_eq!(outcome.status, FinalStatus::Modified);
        assert!(outcome.message.contains("to 120"));
        assert!(outcome.message.contains("originally proposed: 115"));
    }

    #[test]
    fn test_modification_applies_supplied_manager() {
        let mut state = state_with(vec![
            employee(1, "Asha", 900),
            employee(2, "Ben", 300),
            employee(3, "Carla", 400),
        ]);
        state.proposal = Some(Proposal::ManagerChange {
            employee_id: 1,
            employee_name: "Asha".to_string(),
            current_manager: "Dana Iyer".to_string(),
            proposed_manager: "Ben".to_string(),
            reason: "Reassignment for better team dynamics in Engineering".to_string(),
        });
        state.human_decision = Some(Decision::Modify);
        state.modification = Some(Modification {
            modified_salary: None,
            modified_manager: Some("Carla".to_string()),
        });

        let update = process_modification(&state);

        let outcome = update.outcome.unwrap();
        assert_eq!(outcome.status, FinalStatus::Modified);
        // The supplied manager wins over the proposed one
        assert!(outcome.message.contains("to Carla"));
        assert!(outcome.message.contains("originally proposed: Ben"));
        assert_eq!(
            update.log_entry.unwrap(),
            "Proposal modified: manager changed to Carla"
        );
    }

    #[test]
    fn test_modification_missing_key_falls_back_to_proposed() {
        let mut state = state_with(vec![employee(1, "Asha", 100)]);
        state.proposal = Some(Proposal::ManagerChange {
            employee_id: 1,
            employee_name: "Asha".to_string(),
            current_manager: "Dana Iyer".to_string(),
            proposed_manager: "Ben".to_string(),
            reason: "Reassignment for better team dynamics in Engineering".to_string(),
        });
        state.human_decision = Some(Decision::Modify);
        // modified_salary set, but the proposal is a manager change
        state.modification = Some(Modification {
            modified_salary: Some(999),
            modified_manager: None,
        });

        let update = process_modification(&state);

        let outcome = update.outcome.unwrap();
        assert_eq!(outcome.status, FinalStatus::Modified);
        assert!(outcome.message.contains("to Ben"));
    }

    #[test]
    fn test_resolver_for_decision() {
        assert_eq!(resolver_for(Decision::Approve), StepName::ProcessApproval);
        assert_eq!(resolver_for(Decision::Reject), StepName::ProcessRejection);
        assert_eq!(resolver_for(Decision::Modify), StepName::ProcessModification);
    }
}
