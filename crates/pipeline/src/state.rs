//! The agent state threaded through both pipelines.
//!
//! [`AgentState`] is an explicit, statically-typed record. Nodes receive it
//! by value and hand back an updated value; fields are populated as the run
//! progresses and are never cleared by a node.

use serde::{Deserialize, Serialize};

use crate::campaign::{AdPlatform, AudienceInsights, CampaignBrief, CampaignGoal, CreativeStrategy};
use crate::routing::MAX_REFINEMENT_ITERATIONS;
use crate::script::{AdScript, EvaluationReport, FinalScriptVariants};

/// Everything known about one campaign run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub campaign_goal: CampaignGoal,
    pub ad_platform: AdPlatform,
    pub brief: CampaignBrief,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_insights: Option<AudienceInsights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_strategy: Option<CreativeStrategy>,

    /// Current candidate script. Required by Script-Evaluation and
    /// Variation-Generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_draft: Option<AdScript>,

    /// Result of the most recent evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_report: Option<EvaluationReport>,

    /// Completed refinement cycles. Starts at 0; bounded by
    /// [`MAX_REFINEMENT_ITERATIONS`].
    #[serde(default)]
    pub iteration_count: u32,

    /// Populated only by Variation-Generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_scripts_variants: Option<FinalScriptVariants>,
}

/// How the draft-and-refine pipeline terminated.
///
/// Both outcomes are terminal and neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftOutcome {
    /// The evaluator approved the draft.
    Approved,
    /// The refinement ceiling was reached without approval.
    BudgetExhausted,
}

impl AgentState {
    /// Creates the initial state for a campaign session.
    pub fn new(campaign_goal: CampaignGoal, ad_platform: AdPlatform, brief: CampaignBrief) -> Self {
        Self {
            campaign_goal,
            ad_platform,
            brief,
            audience_insights: None,
            creative_strategy: None,
            script_draft: None,
            evaluation_report: None,
            iteration_count: 0,
            final_scripts_variants: None,
        }
    }

    /// `true` when the latest evaluation approved the draft.
    pub fn is_approved(&self) -> bool {
        self.evaluation_report
            .as_ref()
            .is_some_and(|r| r.is_approved_for_next_stage)
    }

    /// The draft, unless it is missing or blank.
    pub fn usable_script_draft(&self) -> Option<&AdScript> {
        self.script_draft.as_ref().filter(|s| !s.is_blank())
    }

    /// How the refinement loop ended, or `None` if it has not ended (or never ran).
    pub fn draft_outcome(&self) -> Option<DraftOutcome> {
        self.evaluation_report.as_ref()?;
        if self.is_approved() {
            Some(DraftOutcome::Approved)
        } else if self.iteration_count >= MAX_REFINEMENT_ITERATIONS {
            Some(DraftOutcome::BudgetExhausted)
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::campaign::ScriptFormat;
    use crate::script::StaticScript;
    use crate::types::QualityScore;

    use super::*;

    pub(crate) fn brief() -> CampaignBrief {
        CampaignBrief {
            product_name: "Brewline".into(),
            product_description: "A cold-brew subscription".into(),
            target_audience: "Remote workers aged 25-40".into(),
            key_benefits: vec!["Fresh every week".into()],
            brand_voice: None,
            additional_context: None,
            format: ScriptFormat::Static,
        }
    }

    pub(crate) fn state_with_report(approved: bool, iteration_count: u32) -> AgentState {
        let mut state = AgentState::new(CampaignGoal::Conversions, AdPlatform::Instagram, brief());
        state.script_draft = Some(AdScript::Static(StaticScript {
            headline: "Cold brew, on repeat".into(),
            primary_text: "Never run out again.".into(),
            visual_description: "Bottles on a desk".into(),
            call_to_action: "Subscribe".into(),
        }));
        state.evaluation_report = Some(EvaluationReport {
            overall_score: QualityScore::new(if approved { 4.5 } else { 2.5 }).unwrap(),
            criteria: vec![],
            strengths: vec![],
            weaknesses: vec!["Hook is generic".into()],
            suggestions: vec![],
            is_approved_for_next_stage: approved,
        });
        state.iteration_count = iteration_count;
        state
    }
}
