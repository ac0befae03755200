//! Plain-text rendering of pipeline results for the terminal.

use std::fmt::Write as _;

use pipeline::{
    AdScript, AgentState, DraftOutcome, EvaluationReport, FinalScriptVariants,
    MAX_REFINEMENT_ITERATIONS,
};

pub fn script(script: &AdScript) -> String {
    let mut out = String::new();
    match script {
        AdScript::Video(video) => {
            if !video.title.trim().is_empty() {
                let _ = writeln!(out, "Title: {}", video.title);
            }
            let _ = writeln!(out, "Hook: {}", video.hook);
            let _ = writeln!(out, "Length: {}s", video.total_duration_seconds());
            for scene in &video.scenes {
                let _ = writeln!(out, "\n  Scene {} ({}s)", scene.scene_number, scene.duration_seconds);
                let _ = writeln!(out, "    Visual:    {}", scene.visual);
                let _ = writeln!(out, "    Voiceover: {}", scene.voiceover);
                if let Some(text) = scene.on_screen_text.as_deref().filter(|t| !t.is_empty()) {
                    let _ = writeln!(out, "    On screen: {text}");
                }
            }
            let _ = write!(out, "\nCall to action: {}", video.call_to_action);
        }
        AdScript::Static(ad) => {
            let _ = writeln!(out, "Headline: {}", ad.headline);
            let _ = writeln!(out, "Primary text: {}", ad.primary_text);
            if !ad.visual_description.trim().is_empty() {
                let _ = writeln!(out, "Visual: {}", ad.visual_description);
            }
            let _ = write!(out, "Call to action: {}", ad.call_to_action);
        }
    }
    out
}

pub fn evaluation(report: &EvaluationReport) -> String {
    let mut out = format!(
        "Score: {} ({})",
        report.overall_score,
        if report.is_approved_for_next_stage {
            "approved"
        } else {
            "not approved"
        }
    );
    for c in &report.criteria {
        let _ = write!(out, "\n  {:<24} {}", c.criterion, c.score);
        if !c.rationale.is_empty() {
            let _ = write!(out, "  {}", c.rationale);
        }
    }
    for (heading, items) in [
        ("Strengths", &report.strengths),
        ("Weaknesses", &report.weaknesses),
        ("Suggestions", &report.suggestions),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = write!(out, "\n{heading}:");
        for item in items {
            let _ = write!(out, "\n  - {item}");
        }
    }
    out
}

/// One line stating how the draft-and-refine pipeline ended.
pub fn outcome(state: &AgentState) -> String {
    match state.draft_outcome() {
        Some(DraftOutcome::Approved) => format!(
            "Approved after {} refinement(s).",
            state.iteration_count
        ),
        Some(DraftOutcome::BudgetExhausted) => format!(
            "Not approved: stopped after {MAX_REFINEMENT_ITERATIONS} refinements. \
             Showing the latest draft."
        ),
        None => "Pipeline did not finish a review.".to_string(),
    }
}

pub fn workflow(state: &AgentState) -> String {
    let mut out = format!(
        "== {} | {} | {} ==\n",
        state.brief.product_name,
        state.campaign_goal.display_name(),
        state.ad_platform.display_name()
    );
    if let Some(draft) = &state.script_draft {
        let _ = writeln!(out, "\n{}", script(draft));
    }
    if let Some(report) = &state.evaluation_report {
        let _ = writeln!(out, "\n{}", evaluation(report));
    }
    let _ = write!(out, "\n{}", outcome(state));
    out
}

pub fn variants(variants: &FinalScriptVariants) -> String {
    let mut out = String::new();
    for (i, variant) in variants.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = writeln!(
            out,
            "-- Variant {}: {} [{}] --",
            i + 1,
            variant.variant_name,
            variant.variant_type.label()
        );
        if !variant.notes.trim().is_empty() {
            let _ = writeln!(out, "Notes: {}", variant.notes);
        }
        out.push_str(&script(&variant.ad_script));
    }
    out
}

#[cfg(test)]
mod tests {
    use pipeline::{
        AdPlatform, CampaignBrief, CampaignGoal, CriterionScore, QualityScore, Scene,
        ScriptFormat, ScriptVariant, StaticScript, VariantType, VideoScript,
    };

    use super::*;

    fn static_ad(headline: &str) -> AdScript {
        AdScript::Static(StaticScript {
            headline: headline.into(),
            primary_text: "Fresh every week.".into(),
            visual_description: String::new(),
            call_to_action: "Subscribe".into(),
        })
    }

    fn report(approved: bool) -> EvaluationReport {
        EvaluationReport {
            overall_score: QualityScore::new(4.3).unwrap(),
            criteria: vec![CriterionScore {
                criterion: "Hook".into(),
                score: QualityScore::new(4.0).unwrap(),
                rationale: "Specific".into(),
            }],
            strengths: vec!["Clear".into()],
            weaknesses: vec![],
            suggestions: vec![],
            is_approved_for_next_stage: approved,
        }
    }

    fn state(approved: bool, iteration_count: u32) -> AgentState {
        let mut state = AgentState::new(
            CampaignGoal::BrandAwareness,
            AdPlatform::Tiktok,
            CampaignBrief {
                product_name: "Brewline".into(),
                product_description: "Cold brew".into(),
                target_audience: "Commuters".into(),
                key_benefits: vec![],
                brand_voice: None,
                additional_context: None,
                format: ScriptFormat::Static,
            },
        );
        state.script_draft = Some(static_ad("Cold brew, on repeat"));
        state.evaluation_report = Some(report(approved));
        state.iteration_count = iteration_count;
        state
    }

    #[test]
    fn video_scripts_list_scenes_and_length() {
        let text = script(&AdScript::Video(VideoScript {
            title: "Mornings".into(),
            hook: "Out again?".into(),
            scenes: vec![
                Scene {
                    scene_number: 1,
                    visual: "Empty fridge".into(),
                    voiceover: "Again?".into(),
                    on_screen_text: Some("Again?!".into()),
                    duration_seconds: 4,
                },
                Scene {
                    scene_number: 2,
                    visual: "Doorstep delivery".into(),
                    voiceover: "Never again.".into(),
                    on_screen_text: None,
                    duration_seconds: 6,
                },
            ],
            call_to_action: "Subscribe".into(),
        }));
        assert!(text.contains("Length: 10s"));
        assert!(text.contains("Scene 2 (6s)"));
        assert!(text.contains("On screen: Again?!"));
        assert!(text.ends_with("Call to action: Subscribe"));
    }

    #[test]
    fn evaluation_shows_score_out_of_five() {
        let text = evaluation(&report(true));
        assert!(text.starts_with("Score: 4.3/5.0 (approved)"));
        assert!(text.contains("- Clear"));
        assert!(!text.contains("Weaknesses"));
    }

    #[test]
    fn outcome_distinguishes_approval_from_exhaustion() {
        assert_eq!(outcome(&state(true, 1)), "Approved after 1 refinement(s).");
        assert!(outcome(&state(false, MAX_REFINEMENT_ITERATIONS)).starts_with("Not approved"));
    }

    #[test]
    fn workflow_has_a_header() {
        let text = workflow(&state(true, 0));
        assert!(text.starts_with("== Brewline | Brand Awareness | TikTok =="));
    }

    #[test]
    fn variants_are_numbered_with_badges() {
        let set = FinalScriptVariants {
            final_scripts_variants: vec![
                ScriptVariant {
                    variant_name: "Panic".into(),
                    variant_type: VariantType::HookFocused,
                    notes: "Leads with the empty fridge".into(),
                    ad_script: static_ad("Out. Again."),
                },
                ScriptVariant {
                    variant_name: "Deadline".into(),
                    variant_type: VariantType::CtaFocused,
                    notes: String::new(),
                    ad_script: static_ad("Today only"),
                },
            ],
        };
        let text = variants(&set);
        assert!(text.contains("-- Variant 1: Panic [Hook-Focused] --"));
        assert!(text.contains("-- Variant 2: Deadline [CTA-Focused] --"));
        assert!(text.contains("Notes: Leads with the empty fridge"));
    }
}
