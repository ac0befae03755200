//! Per-user campaign session.
//!
//! Holds the result of the last draft-and-refine run and the last variation
//! run between user actions. Generating variations requires a prior workflow
//! result; starting a new campaign discards both.

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::identifiers::SessionId;
use crate::state::AgentState;
use crate::types::Timestamp;

/// Message shown when variations are requested before any script exists.
pub const NO_BASE_SCRIPT: &str = "No base script found. Please generate a script first.";

/// State kept for one user between actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSession {
    pub id: SessionId,
    pub started_at: Timestamp,

    /// Final state of the last draft-and-refine run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_result: Option<AgentState>,

    /// Final state of the last variation run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations_result: Option<AgentState>,
}

impl Default for CampaignSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new_random(),
            started_at: Timestamp::now(),
            workflow_result: None,
            variations_result: None,
        }
    }

    /// Stores a finished workflow. Variations built on an older draft are dropped.
    pub fn record_workflow(&mut self, state: AgentState) -> &AgentState {
        self.variations_result = None;
        self.workflow_result.insert(state)
    }

    pub fn record_variations(&mut self, state: AgentState) -> &AgentState {
        self.variations_result.insert(state)
    }

    /// The workflow result that variations are generated from.
    ///
    /// Fails with [`NO_BASE_SCRIPT`] when no workflow has run yet or its
    /// draft is missing.
    pub fn require_workflow_result(&self) -> Result<&AgentState, PipelineError> {
        self.workflow_result
            .as_ref()
            .filter(|state| state.usable_script_draft().is_some())
            .ok_or_else(|| PipelineError::precondition("session", NO_BASE_SCRIPT))
    }

    /// Discards the last variation run ("Generate New Variations").
    pub fn clear_variations(&mut self) {
        self.variations_result = None;
    }

    /// Starts over with a fresh session id ("New Campaign").
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
