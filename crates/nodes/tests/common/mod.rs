#![allow(dead_code)]

use std::sync::Arc;

use nodes::testing::ScriptedLlmProvider;
use nodes::{AdScriptPipelines, LlmGateway};
use pipeline::{
    AdPlatform, AdScript, AgentState, CampaignBrief, CampaignGoal, ModelId, ScriptFormat,
    StaticScript,
};
use serde_json::json;

pub fn brief(format: ScriptFormat) -> CampaignBrief {
    CampaignBrief {
        product_name: "Brewline".into(),
        product_description: "Cold brew delivered weekly".into(),
        target_audience: "Remote workers aged 25-40".into(),
        key_benefits: vec!["Never run out".into(), "Cancel any time".into()],
        brand_voice: Some("Friendly, a little dry".into()),
        additional_context: None,
        format,
    }
}

pub fn initial_state(format: ScriptFormat) -> AgentState {
    AgentState::new(CampaignGoal::Conversions, AdPlatform::Instagram, brief(format))
}

pub fn pipelines(provider: Arc<ScriptedLlmProvider>) -> AdScriptPipelines {
    let gateway = LlmGateway::new(provider, ModelId::new("gpt-4o").unwrap());
    AdScriptPipelines::new(&gateway).unwrap()
}

pub fn insights_json() -> String {
    json!({
        "persona_summary": "Remote workers who live on coffee",
        "pain_points": ["Running out mid-week"],
        "motivations": ["A better morning ritual"],
        "objections": ["Subscriptions are hard to cancel"],
        "preferred_tone": "warm"
    })
    .to_string()
}

pub fn strategy_json() -> String {
    json!({
        "core_message": "Great coffee that shows up on its own",
        "creative_angle": "The empty-fridge moment",
        "hook_ideas": ["Out of coffee again?"],
        "tone": "playful",
        "call_to_action_direction": "Start a subscription"
    })
    .to_string()
}

pub fn static_script_json(headline: &str) -> String {
    json!({
        "script_type": "Static",
        "headline": headline,
        "primary_text": "Fresh cold brew on your doorstep every Monday.",
        "visual_description": "A fridge door opening onto neat rows of bottles",
        "call_to_action": "Subscribe now"
    })
    .to_string()
}

pub fn video_script_json() -> String {
    json!({
        "script_type": "Video",
        "title": "Monday Fridge",
        "hook": "Out of coffee again?",
        "scenes": [
            { "scene_number": 1, "visual": "Empty fridge", "voiceover": "Again?", "duration_seconds": 3 }
        ],
        "call_to_action": "Subscribe now"
    })
    .to_string()
}

pub fn evaluation_json(approved: bool, score: f64) -> String {
    json!({
        "overall_score": score,
        "criteria": [
            { "criterion": "Hook strength", "score": score, "rationale": "Relatable opener" }
        ],
        "strengths": ["Clear benefit"],
        "weaknesses": if approved { json!([]) } else { json!(["CTA lacks urgency"]) },
        "suggestions": if approved { json!([]) } else { json!(["Add a first-week discount"]) },
        "is_approved_for_next_stage": approved
    })
    .to_string()
}

pub fn variants_json() -> String {
    let variant = |name: &str, kind: &str, headline: &str| {
        json!({
            "variant_name": name,
            "variant_type": kind,
            "notes": format!("{name} explores a different angle"),
            "ad_script": {
                "script_type": "Static",
                "headline": headline,
                "primary_text": "Fresh cold brew, every week.",
                "visual_description": "Bottles on a desk",
                "call_to_action": "Subscribe now"
            }
        })
    };
    json!({
        "final_scripts_variants": [
            variant("Morning Panic", "Hook-Focused", "Out of coffee. Again."),
            variant("Last Chance", "CTA-Focused", "First week free, today only"),
            variant("Small Joys", "Emotional/Tonal", "Your Monday, improved")
        ]
    })
    .to_string()
}

pub fn approved_draft_state() -> AgentState {
    let mut state = initial_state(ScriptFormat::Static);
    state.script_draft = Some(AdScript::Static(StaticScript {
        headline: "Cold brew, on repeat".into(),
        primary_text: "Never run out again.".into(),
        visual_description: "Bottles lined up in a fridge".into(),
        call_to_action: "Subscribe".into(),
    }));
    state
}
