//! Message builders, one per node.
//!
//! Each builder turns the current [`AgentState`] into a `[system, user]`
//! message pair. Builders own their node's preconditions: if the state lacks
//! what the prompt needs they fail with [`PipelineError::Precondition`] and no
//! request is sent.

use pipeline::node_ids::{
    AUDIENCE_INSIGHT, CREATIVE_STRATEGY, SCRIPT_EVALUATION, SCRIPT_GENERATION, SCRIPT_REFINEMENT,
    VARIATION_GENERATION,
};
use pipeline::{
    AdScript, AgentState, AudienceInsights, ChatMessage, CreativeStrategy, EvaluationReport,
    PipelineError, ScriptFormat,
};

/// Raised by Variation-Generation when there is nothing to vary.
pub const MISSING_APPROVED_DRAFT: &str =
    "Approved script draft is missing for variation generation.";

const VIDEO_SCRIPT_SHAPE: &str = r#"{
  "script_type": "Video",
  "title": "string",
  "hook": "string",
  "scenes": [
    {
      "scene_number": 1,
      "visual": "string",
      "voiceover": "string",
      "on_screen_text": "string or null",
      "duration_seconds": 5
    }
  ],
  "call_to_action": "string"
}"#;

const STATIC_SCRIPT_SHAPE: &str = r#"{
  "script_type": "Static",
  "headline": "string",
  "primary_text": "string",
  "visual_description": "string",
  "call_to_action": "string"
}"#;

const AUDIENCE_INSIGHTS_SHAPE: &str = r#"{
  "persona_summary": "string",
  "pain_points": ["string"],
  "motivations": ["string"],
  "objections": ["string"],
  "preferred_tone": "string"
}"#;

const CREATIVE_STRATEGY_SHAPE: &str = r#"{
  "core_message": "string",
  "creative_angle": "string",
  "hook_ideas": ["string"],
  "tone": "string",
  "call_to_action_direction": "string"
}"#;

const EVALUATION_REPORT_SHAPE: &str = r#"{
  "overall_score": 0.0,
  "criteria": [
    { "criterion": "string", "score": 0.0, "rationale": "string" }
  ],
  "strengths": ["string"],
  "weaknesses": ["string"],
  "suggestions": ["string"],
  "is_approved_for_next_stage": false
}"#;

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn audience_insight_messages(state: &AgentState) -> Result<Vec<ChatMessage>, PipelineError> {
    state
        .brief
        .validate()
        .map_err(|msg| PipelineError::precondition(AUDIENCE_INSIGHT, format!("invalid brief: {msg}")))?;

    let system = format!(
        "You are a senior consumer-research strategist. Build a sharp, concrete \
         picture of the people this ad must reach: who they are, what hurts, what \
         they want, and why they might say no.\n\n\
         Respond with a single JSON object of this shape:\n{AUDIENCE_INSIGHTS_SHAPE}"
    );
    let user = format!(
        "{}\n\nDescribe the target audience for this campaign.",
        describe_campaign(state)
    );
    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

pub fn creative_strategy_messages(state: &AgentState) -> Result<Vec<ChatMessage>, PipelineError> {
    let insights = require_insights(state, CREATIVE_STRATEGY)?;

    let system = format!(
        "You are a creative director at a performance-marketing agency. Choose one \
         clear creative direction for a {} ad on {} that serves the campaign goal.\n\n\
         Respond with a single JSON object of this shape:\n{CREATIVE_STRATEGY_SHAPE}",
        state.brief.format,
        state.ad_platform.display_name()
    );
    let user = format!(
        "{}\n\n{}\n\nPropose the creative strategy.",
        describe_campaign(state),
        describe_insights(insights)
    );
    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

pub fn script_generation_messages(state: &AgentState) -> Result<Vec<ChatMessage>, PipelineError> {
    let insights = require_insights(state, SCRIPT_GENERATION)?;
    let strategy = state.creative_strategy.as_ref().ok_or_else(|| {
        PipelineError::precondition(SCRIPT_GENERATION, "creative strategy is missing")
    })?;

    let system = format!(
        "You are an award-winning ad copywriter. Write a {} ad script for {} that \
         follows the creative strategy exactly. Open with a hook that earns the \
         next second of attention and close with a single, specific call to action.\n\n\
         Respond with a single JSON object of this shape:\n{}",
        state.brief.format,
        state.ad_platform.display_name(),
        script_shape(state.brief.format)
    );
    let user = format!(
        "{}\n\n{}\n\n{}\n\nWrite the script.",
        describe_campaign(state),
        describe_insights(insights),
        describe_strategy(strategy)
    );
    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

pub fn script_evaluation_messages(state: &AgentState) -> Result<Vec<ChatMessage>, PipelineError> {
    let draft = state.usable_script_draft().ok_or_else(|| {
        PipelineError::precondition(SCRIPT_EVALUATION, "script draft is missing")
    })?;

    let system = format!(
        "You are a demanding creative reviewer. Score the script from 0.0 to 5.0 on \
         hook strength, clarity of message, audience fit, platform fit and call to \
         action. Approve it for the next stage only if it is ready to run as-is. \
         When you do not approve it, list the weaknesses and concrete suggestions \
         the writer must address.\n\n\
         Respond with a single JSON object of this shape:\n{EVALUATION_REPORT_SHAPE}"
    );
    let user = format!(
        "{}\n\nScript to review:\n{}",
        describe_campaign(state),
        render_script(SCRIPT_EVALUATION, draft)?
    );
    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

pub fn script_refinement_messages(state: &AgentState) -> Result<Vec<ChatMessage>, PipelineError> {
    let draft = state.usable_script_draft().ok_or_else(|| {
        PipelineError::precondition(SCRIPT_REFINEMENT, "script draft is missing")
    })?;
    let report = state.evaluation_report.as_ref().ok_or_else(|| {
        PipelineError::precondition(SCRIPT_REFINEMENT, "evaluation report is missing")
    })?;

    let system = format!(
        "You are an ad copywriter revising your own script after review. Keep what \
         works, fix every weakness the reviewer raised, and keep the same format.\n\n\
         Respond with a single JSON object of this shape:\n{}",
        script_shape(draft.format())
    );
    let user = format!(
        "{}\n\nCurrent script:\n{}\n\n{}\n\nWrite the revised script.",
        describe_campaign(state),
        render_script(SCRIPT_REFINEMENT, draft)?,
        describe_feedback(report)
    );
    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

pub fn variation_generation_messages(
    state: &AgentState,
) -> Result<Vec<ChatMessage>, PipelineError> {
    let draft = state
        .usable_script_draft()
        .ok_or_else(|| PipelineError::precondition(VARIATION_GENERATION, MISSING_APPROVED_DRAFT))?;

    let system = format!(
        "You are an A/B-testing specialist. Produce exactly three variants of the \
         approved script, one per category:\n\
         1. hook_focused: a different opening that leads with another pain point or aspiration.\n\
         2. cta_focused: a stronger, more urgent call to action.\n\
         3. emotional_tonal: different emotional triggers and tone.\n\
         Each variant keeps the {} format of the original.\n\n\
         Respond with a single JSON object of this shape:\n\
         {{\n  \"final_scripts_variants\": [\n    {{\n      \"variant_name\": \"string\",\n      \
         \"variant_type\": \"hook_focused | cta_focused | emotional_tonal\",\n      \
         \"notes\": \"string\",\n      \"ad_script\": {}\n    }}\n  ]\n}}",
        draft.format(),
        script_shape(draft.format())
    );
    let user = format!(
        "{}\n\nApproved script:\n{}\n\nWrite the three variants.",
        describe_campaign(state),
        render_script(VARIATION_GENERATION, draft)?
    );
    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

fn script_shape(format: ScriptFormat) -> &'static str {
    match format {
        ScriptFormat::Video => VIDEO_SCRIPT_SHAPE,
        ScriptFormat::Static => STATIC_SCRIPT_SHAPE,
    }
}

fn require_insights<'a>(
    state: &'a AgentState,
    node: &str,
) -> Result<&'a AudienceInsights, PipelineError> {
    state
        .audience_insights
        .as_ref()
        .ok_or_else(|| PipelineError::precondition(node, "audience insights are missing"))
}

fn describe_campaign(state: &AgentState) -> String {
    let brief = &state.brief;
    let mut out = format!(
        "=== CAMPAIGN ===\n\
         Goal: {}\n\
         Platform: {}\n\
         Format: {}\n\
         Product: {}\n\
         Description: {}\n\
         Target audience: {}\n\
         Key benefits:\n{}",
        state.campaign_goal.display_name(),
        state.ad_platform.display_name(),
        brief.format,
        brief.product_name,
        brief.product_description,
        brief.target_audience,
        bullets(&brief.key_benefits)
    );
    if let Some(voice) = brief.brand_voice.as_deref().filter(|v| !v.trim().is_empty()) {
        out.push_str(&format!("\nBrand voice: {voice}"));
    }
    if let Some(extra) = brief
        .additional_context
        .as_deref()
        .filter(|v| !v.trim().is_empty())
    {
        out.push_str(&format!("\nAdditional context: {extra}"));
    }
    out
}

fn describe_insights(insights: &AudienceInsights) -> String {
    format!(
        "=== AUDIENCE ===\n\
         Persona: {}\n\
         Pain points:\n{}\n\
         Motivations:\n{}\n\
         Objections:\n{}\n\
         Preferred tone: {}",
        insights.persona_summary,
        bullets(&insights.pain_points),
        bullets(&insights.motivations),
        bullets(&insights.objections),
        insights.preferred_tone
    )
}

fn describe_strategy(strategy: &CreativeStrategy) -> String {
    format!(
        "=== STRATEGY ===\n\
         Core message: {}\n\
         Creative angle: {}\n\
         Hook ideas:\n{}\n\
         Tone: {}\n\
         Call to action: {}",
        strategy.core_message,
        strategy.creative_angle,
        bullets(&strategy.hook_ideas),
        strategy.tone,
        strategy.call_to_action_direction
    )
}

fn describe_feedback(report: &EvaluationReport) -> String {
    format!(
        "=== REVIEW ({}) ===\n\
         Strengths:\n{}\n\
         Weaknesses:\n{}\n\
         Suggestions:\n{}",
        report.overall_score,
        bullets(&report.strengths),
        bullets(&report.weaknesses),
        bullets(&report.suggestions)
    )
}

fn render_script(node: &str, script: &AdScript) -> Result<String, PipelineError> {
    serde_json::to_string_pretty(script).map_err(|err| {
        PipelineError::precondition(node, format!("script draft could not be rendered: {err}"))
    })
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use pipeline::{
        AdPlatform, CampaignBrief, CampaignGoal, MessageRole, QualityScore, StaticScript,
    };

    use super::*;

    fn state() -> AgentState {
        AgentState::new(
            CampaignGoal::LeadGeneration,
            AdPlatform::Linkedin,
            CampaignBrief {
                product_name: "Ledgerly".into(),
                product_description: "Bookkeeping for freelancers".into(),
                target_audience: "Independent designers".into(),
                key_benefits: vec!["Invoices in one click".into()],
                brand_voice: Some("Calm and precise".into()),
                additional_context: None,
                format: ScriptFormat::Static,
            },
        )
    }

    fn draft() -> AdScript {
        AdScript::Static(StaticScript {
            headline: "Taxes, handled".into(),
            primary_text: "Spend April designing, not filing.".into(),
            visual_description: "A relaxed designer at a desk".into(),
            call_to_action: "Start free".into(),
        })
    }

    #[test]
    fn audience_prompt_carries_the_brief() {
        let messages = audience_insight_messages(&state()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.contains("persona_summary"));
        assert!(messages[1].content.contains("Ledgerly"));
        assert!(messages[1].content.contains("Lead Generation"));
        assert!(messages[1].content.contains("Brand voice: Calm and precise"));
    }

    #[test]
    fn audience_prompt_rejects_incomplete_brief() {
        let mut state = state();
        state.brief.product_name = " ".into();
        let err = audience_insight_messages(&state).unwrap_err();
        assert!(matches!(err, PipelineError::Precondition { ref node, .. } if node == AUDIENCE_INSIGHT));
    }

    #[test]
    fn generation_requires_planning_artefacts() {
        let err = script_generation_messages(&state()).unwrap_err();
        assert!(err.to_string().contains("audience insights are missing"));
    }

    #[test]
    fn generation_asks_for_the_brief_format() {
        let mut state = state();
        state.audience_insights = Some(AudienceInsights {
            persona_summary: "Designers".into(),
            pain_points: vec!["Paperwork".into()],
            motivations: vec![],
            objections: vec![],
            preferred_tone: "reassuring".into(),
        });
        state.creative_strategy = Some(CreativeStrategy {
            core_message: "Own your time".into(),
            creative_angle: "Before/after".into(),
            hook_ideas: vec![],
            tone: "light".into(),
            call_to_action_direction: "Free trial".into(),
        });
        let messages = script_generation_messages(&state).unwrap();
        assert!(messages[0].content.contains(r#""script_type": "Static""#));
        assert!(!messages[0].content.contains("scenes"));
    }

    #[test]
    fn refinement_includes_reviewer_feedback() {
        let mut state = state();
        state.script_draft = Some(draft());
        state.evaluation_report = Some(EvaluationReport {
            overall_score: QualityScore::new(2.0).unwrap(),
            criteria: vec![],
            strengths: vec![],
            weaknesses: vec!["CTA is vague".into()],
            suggestions: vec!["Name the trial length".into()],
            is_approved_for_next_stage: false,
        });
        let messages = script_refinement_messages(&state).unwrap();
        assert!(messages[1].content.contains("- CTA is vague"));
        assert!(messages[1].content.contains("2.0/5.0"));
        assert!(messages[1].content.contains("Taxes, handled"));
    }

    #[test]
    fn variation_prompt_names_all_three_categories() {
        let mut state = state();
        state.script_draft = Some(draft());
        let messages = variation_generation_messages(&state).unwrap();
        for category in ["hook_focused", "cta_focused", "emotional_tonal"] {
            assert!(messages[0].content.contains(category));
        }
    }

    #[test]
    fn variation_prompt_treats_blank_draft_as_missing() {
        let mut state = state();
        state.script_draft = Some(AdScript::Static(StaticScript {
            headline: "".into(),
            primary_text: " ".into(),
            visual_description: "".into(),
            call_to_action: "".into(),
        }));
        let err = variation_generation_messages(&state).unwrap_err();
        assert!(err.to_string().contains(MISSING_APPROVED_DRAFT));
    }
}
