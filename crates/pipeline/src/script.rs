//! Ad scripts, their evaluation, and A/B-test variants.
//!
//! [`AdScript`] is a tagged union over the two script forms; the
//! `script_type` tag is part of the serialised form.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::campaign::{normalise_label, ScriptFormat};
use crate::structured::{require_text, StructuredOutput};
use crate::types::QualityScore;

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

/// A candidate advertising script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "script_type")]
pub enum AdScript {
    /// Scene-by-scene script for a video ad.
    Video(VideoScript),
    /// Copy and visual direction for an image ad.
    Static(StaticScript),
}

impl AdScript {
    /// The form this script takes.
    pub fn format(&self) -> ScriptFormat {
        match self {
            AdScript::Video(_) => ScriptFormat::Video,
            AdScript::Static(_) => ScriptFormat::Static,
        }
    }

    /// The call to action, whichever form the script takes.
    pub fn call_to_action(&self) -> &str {
        match self {
            AdScript::Video(v) => &v.call_to_action,
            AdScript::Static(s) => &s.call_to_action,
        }
    }

    /// `true` when the script carries no usable content.
    ///
    /// A blank script is treated exactly like a missing one by every node
    /// precondition.
    pub fn is_blank(&self) -> bool {
        match self {
            AdScript::Video(v) => {
                v.scenes.is_empty()
                    && [&v.title, &v.hook, &v.call_to_action]
                        .iter()
                        .all(|s| s.trim().is_empty())
            }
            AdScript::Static(s) => [
                &s.headline,
                &s.primary_text,
                &s.visual_description,
                &s.call_to_action,
            ]
            .iter()
            .all(|f| f.trim().is_empty()),
        }
    }
}

impl StructuredOutput for AdScript {
    const SHAPE: &'static str = "AdScript";

    fn validate(&self) -> Result<(), String> {
        match self {
            AdScript::Video(v) => {
                require_text("hook", &v.hook)?;
                require_text("call_to_action", &v.call_to_action)?;
                if v.scenes.is_empty() {
                    return Err("a video script needs at least one scene".to_string());
                }
                for scene in &v.scenes {
                    if scene.voiceover.trim().is_empty() && scene.visual.trim().is_empty() {
                        return Err(format!("scene {} is empty", scene.scene_number));
                    }
                }
                Ok(())
            }
            AdScript::Static(s) => {
                require_text("headline", &s.headline)?;
                require_text("primary_text", &s.primary_text)?;
                require_text("call_to_action", &s.call_to_action)
            }
        }
    }
}

/// A video ad script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoScript {
    #[serde(default)]
    pub title: String,
    /// Opening line or visual meant to stop the scroll in the first seconds.
    pub hook: String,
    pub scenes: Vec<Scene>,
    pub call_to_action: String,
}

impl VideoScript {
    /// Sum of all scene durations.
    pub fn total_duration_seconds(&self) -> u32 {
        self.scenes.iter().map(|s| s.duration_seconds).sum()
    }
}

/// One scene of a [`VideoScript`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    pub visual: String,
    pub voiceover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_screen_text: Option<String>,
    #[serde(default)]
    pub duration_seconds: u32,
}

/// A static (single image) ad script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticScript {
    pub headline: String,
    pub primary_text: String,
    #[serde(default)]
    pub visual_description: String,
    pub call_to_action: String,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The evaluator's verdict on the current draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub overall_score: QualityScore,
    #[serde(default)]
    pub criteria: Vec<CriterionScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Whether the draft may leave the refinement loop.
    pub is_approved_for_next_stage: bool,
}

impl StructuredOutput for EvaluationReport {
    const SHAPE: &'static str = "EvaluationReport";

    fn validate(&self) -> Result<(), String> {
        for c in &self.criteria {
            require_text("criterion", &c.criterion)?;
        }
        Ok(())
    }
}

/// Score for one evaluation criterion (e.g. hook strength, clarity of CTA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: QualityScore,
    #[serde(default)]
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// The A/B-testing strategy a variant explores.
///
/// Parsed leniently: `"Hook-Focused"`, `"hook focused"` and `"hook"` all map to
/// [`VariantType::HookFocused`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VariantType {
    /// Leads with a different pain point or aspiration.
    HookFocused,
    /// Features a stronger, more urgent call to action.
    CtaFocused,
    /// Uses different emotional triggers and tone.
    EmotionalTonal,
}

impl VariantType {
    /// The three categories every variant set must cover.
    pub const ALL: [VariantType; 3] = [
        VariantType::HookFocused,
        VariantType::CtaFocused,
        VariantType::EmotionalTonal,
    ];

    /// Machine name, identical to the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            VariantType::HookFocused => "hook_focused",
            VariantType::CtaFocused => "cta_focused",
            VariantType::EmotionalTonal => "emotional_tonal",
        }
    }

    /// Badge label for display.
    pub fn label(self) -> &'static str {
        match self {
            VariantType::HookFocused => "Hook-Focused",
            VariantType::CtaFocused => "CTA-Focused",
            VariantType::EmotionalTonal => "Emotional/Tonal",
        }
    }
}

impl FromStr for VariantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_label(s).as_str() {
            "hook_focused" | "hook" | "hook_variant" => Ok(VariantType::HookFocused),
            "cta_focused" | "cta" | "call_to_action" | "call_to_action_focused" | "cta_variant" => {
                Ok(VariantType::CtaFocused)
            }
            "emotional_tonal" | "emotional" | "tonal" | "emotional_focused" | "tone" => {
                Ok(VariantType::EmotionalTonal)
            }
            _ => Err(format!("unknown variant type '{s}'")),
        }
    }
}

impl TryFrom<String> for VariantType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VariantType> for String {
    fn from(t: VariantType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for VariantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One A/B-test alternative of the approved script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptVariant {
    pub variant_name: String,
    pub variant_type: VariantType,
    /// Why this variant differs from the base script.
    #[serde(default)]
    pub notes: String,
    pub ad_script: AdScript,
}

/// The variant set produced by Variation-Generation.
///
/// Always holds exactly three variants, one per [`VariantType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScriptVariants {
    pub final_scripts_variants: Vec<ScriptVariant>,
}

impl FinalScriptVariants {
    /// Number of variants the A/B-testing contract requires.
    pub const REQUIRED: usize = 3;

    /// Iterates the variants in the order the model produced them.
    pub fn iter(&self) -> std::slice::Iter<'_, ScriptVariant> {
        self.final_scripts_variants.iter()
    }

    /// Returns the variant of the given category, if present.
    pub fn by_type(&self, variant_type: VariantType) -> Option<&ScriptVariant> {
        self.final_scripts_variants
            .iter()
            .find(|v| v.variant_type == variant_type)
    }

    /// Number of variants; three once validated.
    pub fn len(&self) -> usize {
        self.final_scripts_variants.len()
    }

    /// True when the model returned no variants.
    pub fn is_empty(&self) -> bool {
        self.final_scripts_variants.is_empty()
    }
}

impl StructuredOutput for FinalScriptVariants {
    const SHAPE: &'static str = "FinalScriptVariants";

    fn validate(&self) -> Result<(), String> {
        if self.len() != Self::REQUIRED {
            return Err(format!(
                "expected exactly {} variants, got {}",
                Self::REQUIRED,
                self.len()
            ));
        }

        let mut seen = HashSet::new();
        for variant in self.iter() {
            require_text("variant_name", &variant.variant_name)?;
            if !seen.insert(variant.variant_type) {
                return Err(format!("duplicate variant type '{}'", variant.variant_type));
            }
            if variant.ad_script.is_blank() {
                return Err(format!("variant '{}' has a blank script", variant.variant_name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_script(headline: &str) -> AdScript {
        AdScript::Static(StaticScript {
            headline: headline.into(),
            primary_text: "Copy".into(),
            visual_description: "A product shot".into(),
            call_to_action: "Shop now".into(),
        })
    }

    fn variant(name: &str, t: VariantType) -> ScriptVariant {
        ScriptVariant {
            variant_name: name.into(),
            variant_type: t,
            notes: String::new(),
            ad_script: static_script(name),
        }
    }

    #[test]
    fn script_tag_is_part_of_the_json() {
        let json = serde_json::to_value(static_script("Hi")).unwrap();
        assert_eq!(json["script_type"], "Static");

        let video: AdScript = serde_json::from_str(
            r#"{"script_type":"Video","hook":"Wait!","call_to_action":"Tap",
                "scenes":[{"scene_number":1,"visual":"close-up","voiceover":"hello","duration_seconds":5},
                          {"scene_number":2,"visual":"wide","voiceover":"bye","duration_seconds":10}]}"#,
        )
        .unwrap();
        assert_eq!(video.format(), ScriptFormat::Video);
        match video {
            AdScript::Video(v) => assert_eq!(v.total_duration_seconds(), 15),
            AdScript::Static(_) => panic!("expected video"),
        }
    }

    #[test]
    fn blank_scripts_are_detected() {
        let blank = AdScript::Static(StaticScript {
            headline: " ".into(),
            primary_text: String::new(),
            visual_description: String::new(),
            call_to_action: String::new(),
        });
        assert!(blank.is_blank());
        assert!(!static_script("Hello").is_blank());
    }

    #[test]
    fn variant_type_parses_model_labels() {
        assert_eq!("Hook-Focused".parse::<VariantType>(), Ok(VariantType::HookFocused));
        assert_eq!("CTA Focused".parse::<VariantType>(), Ok(VariantType::CtaFocused));
        assert_eq!("Emotional/Tonal".parse::<VariantType>(), Ok(VariantType::EmotionalTonal));
        assert!("humour".parse::<VariantType>().is_err());
    }

    #[test]
    fn variant_set_requires_exactly_three() {
        let two = FinalScriptVariants {
            final_scripts_variants: vec![
                variant("A", VariantType::HookFocused),
                variant("B", VariantType::CtaFocused),
            ],
        };
        assert!(two.validate().unwrap_err().contains("exactly 3"));
    }

    #[test]
    fn variant_set_requires_distinct_types() {
        let dup = FinalScriptVariants {
            final_scripts_variants: vec![
                variant("A", VariantType::HookFocused),
                variant("B", VariantType::HookFocused),
                variant("C", VariantType::CtaFocused),
            ],
        };
        assert!(dup.validate().unwrap_err().contains("duplicate"));

        let ok = FinalScriptVariants {
            final_scripts_variants: vec![
                variant("A", VariantType::HookFocused),
                variant("B", VariantType::CtaFocused),
                variant("C", VariantType::EmotionalTonal),
            ],
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.by_type(VariantType::CtaFocused).map(|v| v.variant_name.as_str()), Some("B"));
    }

    #[test]
    fn bare_rejection_decodes() {
        let report: EvaluationReport = crate::decode_structured(
            r#"{"overall_score": 2.0, "is_approved_for_next_stage": false}"#,
        )
        .unwrap();
        assert!(!report.is_approved_for_next_stage);
        assert!(report.weaknesses.is_empty() && report.suggestions.is_empty());
    }

    #[test]
    fn report_score_must_stay_on_the_scale() {
        let result = crate::decode_structured::<EvaluationReport>(
            r#"{"overall_score": 6.5, "is_approved_for_next_stage": true}"#,
        );
        assert!(result.is_err());
    }
}
