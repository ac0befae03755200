//! Bounded refinement routing.
//!
//! After every evaluation the draft-and-refine pipeline either terminates or
//! loops back through Script-Refinement. The policy, evaluated in order:
//!
//! 1. approved by the evaluator → terminate (success);
//! 2. `iteration_count >= MAX_REFINEMENT_ITERATIONS` → terminate (budget exhausted);
//! 3. otherwise → refine.
//!
//! Script-Refinement increments `iteration_count` after it has produced the
//! revised draft, so the ceiling admits at most three refinements and four
//! evaluations in total.

use tracing::{info, warn};

use crate::graph::{Router, END};
use crate::node_ids::SCRIPT_REFINEMENT;
use crate::state::AgentState;

/// Hard ceiling on refine-then-reevaluate cycles.
pub const MAX_REFINEMENT_ITERATIONS: u32 = 3;

/// What to do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementDecision {
    /// Terminate: the evaluator approved the draft.
    Approved,
    /// Terminate: the ceiling was reached without approval.
    BudgetExhausted,
    /// Loop back through Script-Refinement.
    Refine,
}

impl RefinementDecision {
    /// Graph label for this decision: [`SCRIPT_REFINEMENT`] or [`END`].
    pub fn label(self) -> &'static str {
        match self {
            RefinementDecision::Refine => SCRIPT_REFINEMENT,
            RefinementDecision::Approved | RefinementDecision::BudgetExhausted => END,
        }
    }

    /// True when the pipeline stops here.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RefinementDecision::Refine)
    }
}

/// Applies the refinement policy to `state`. Logs, but has no other side effects.
pub fn route_after_evaluation(state: &AgentState) -> RefinementDecision {
    if state.is_approved() {
        info!(
            iteration = state.iteration_count,
            "Script approved by evaluator; ending draft pipeline"
        );
        return RefinementDecision::Approved;
    }

    if state.iteration_count >= MAX_REFINEMENT_ITERATIONS {
        warn!(
            iteration = state.iteration_count,
            max = MAX_REFINEMENT_ITERATIONS,
            "Max refinement iterations reached without approval; ending draft pipeline"
        );
        return RefinementDecision::BudgetExhausted;
    }

    info!(
        "Script not approved. Iteration {}/{}; sending to {SCRIPT_REFINEMENT}",
        state.iteration_count + 1,
        MAX_REFINEMENT_ITERATIONS
    );
    RefinementDecision::Refine
}

/// [`Router`] wrapper around [`route_after_evaluation`] for the conditional
/// edge leaving Script-Evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefinementRouter;

impl Router<AgentState> for RefinementRouter {
    fn labels(&self) -> &[&'static str] {
        &[SCRIPT_REFINEMENT, END]
    }

    fn route(&self, state: &AgentState) -> &'static str {
        route_after_evaluation(state).label()
    }
}
