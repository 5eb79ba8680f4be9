// SPDX-License-Identifier: MIT

//! Post-interrupt routing
//!
//! The single conditional fork in the graph: after the interrupt, the
//! human decision selects the resolver step.

use super::nodes::{resolver_for, StepName};
use super::state::WorkflowState;

/// Route from the interrupt boundary based on `human_decision` alone.
///
/// An absent decision routes back to the suspension boundary rather than
/// erroring. `submit_decision` always sets the decision before routing,
/// so the self-loop is unreachable in normal operation.
pub fn route(state: &WorkflowState) -> StepName {
    match state.human_decision {
        Some(decision) => resolver_for(decision),
        None => StepName::HumanApproval,
    }
}
