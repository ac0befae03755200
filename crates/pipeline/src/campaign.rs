//! Campaign inputs and the upstream planning artefacts derived from them.
//!
//! [`CampaignGoal`], [`AdPlatform`] and [`CampaignBrief`] are supplied by the
//! caller when a session starts. [`AudienceInsights`] and [`CreativeStrategy`]
//! are produced by the first two nodes of the draft-and-refine pipeline.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::structured::{require_text, StructuredOutput};

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// What the advertiser wants the campaign to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignGoal {
    BrandAwareness,
    LeadGeneration,
    Conversions,
    AppInstalls,
    Engagement,
    WebsiteTraffic,
}

impl CampaignGoal {
    /// All goals, in presentation order.
    pub const ALL: [CampaignGoal; 6] = [
        CampaignGoal::BrandAwareness,
        CampaignGoal::LeadGeneration,
        CampaignGoal::Conversions,
        CampaignGoal::AppInstalls,
        CampaignGoal::Engagement,
        CampaignGoal::WebsiteTraffic,
    ];

    /// Machine name, identical to the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignGoal::BrandAwareness => "brand_awareness",
            CampaignGoal::LeadGeneration => "lead_generation",
            CampaignGoal::Conversions => "conversions",
            CampaignGoal::AppInstalls => "app_installs",
            CampaignGoal::Engagement => "engagement",
            CampaignGoal::WebsiteTraffic => "website_traffic",
        }
    }

    /// Title-cased label for display (e.g. `"Brand Awareness"`).
    pub fn display_name(self) -> String {
        title_case(self.as_str())
    }
}

impl FromStr for CampaignGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalise_label(s);
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| format!("unknown campaign goal '{s}'"))
    }
}

impl std::fmt::Display for CampaignGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// The advertising platform the script is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdPlatform {
    Meta,
    Instagram,
    Tiktok,
    Youtube,
    Linkedin,
    GoogleDisplay,
    X,
}

impl AdPlatform {
    /// All platforms, in presentation order.
    pub const ALL: [AdPlatform; 7] = [
        AdPlatform::Meta,
        AdPlatform::Instagram,
        AdPlatform::Tiktok,
        AdPlatform::Youtube,
        AdPlatform::Linkedin,
        AdPlatform::GoogleDisplay,
        AdPlatform::X,
    ];

    /// Machine name, identical to the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            AdPlatform::Meta => "meta",
            AdPlatform::Instagram => "instagram",
            AdPlatform::Tiktok => "tiktok",
            AdPlatform::Youtube => "youtube",
            AdPlatform::Linkedin => "linkedin",
            AdPlatform::GoogleDisplay => "google_display",
            AdPlatform::X => "x",
        }
    }

    /// Human-readable platform name.
    pub fn display_name(self) -> &'static str {
        match self {
            AdPlatform::Meta => "Meta (Facebook)",
            AdPlatform::Instagram => "Instagram",
            AdPlatform::Tiktok => "TikTok",
            AdPlatform::Youtube => "YouTube",
            AdPlatform::Linkedin => "LinkedIn",
            AdPlatform::GoogleDisplay => "Google Display",
            AdPlatform::X => "X",
        }
    }
}

impl FromStr for AdPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalise_label(s);
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| format!("unknown ad platform '{s}'"))
    }
}

impl std::fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// Whether the campaign needs a video script or a static (image + copy) ad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptFormat {
    #[default]
    Video,
    Static,
}

impl FromStr for ScriptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_label(s).as_str() {
            "video" => Ok(ScriptFormat::Video),
            "static" | "image" => Ok(ScriptFormat::Static),
            _ => Err(format!("unknown script format '{s}'")),
        }
    }
}

impl std::fmt::Display for ScriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptFormat::Video => f.write_str("Video"),
            ScriptFormat::Static => f.write_str("Static"),
        }
    }
}

// ---------------------------------------------------------------------------
// Brief
// ---------------------------------------------------------------------------

/// Free-text description of what is being advertised and to whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBrief {
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    #[serde(default)]
    pub key_benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(default)]
    pub format: ScriptFormat,
}

impl CampaignBrief {
    /// Checks that the fields every prompt depends on are present.
    pub fn validate(&self) -> Result<(), String> {
        require_text("product_name", &self.product_name)?;
        require_text("product_description", &self.product_description)?;
        require_text("target_audience", &self.target_audience)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Planning artefacts
// ---------------------------------------------------------------------------

/// Who the ad is talking to, as understood by the Audience-Insight node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceInsights {
    pub persona_summary: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub motivations: Vec<String>,
    #[serde(default)]
    pub objections: Vec<String>,
    pub preferred_tone: String,
}

impl StructuredOutput for AudienceInsights {
    const SHAPE: &'static str = "AudienceInsights";

    fn validate(&self) -> Result<(), String> {
        require_text("persona_summary", &self.persona_summary)
    }
}

/// The creative direction chosen for the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeStrategy {
    pub core_message: String,
    pub creative_angle: String,
    #[serde(default)]
    pub hook_ideas: Vec<String>,
    pub tone: String,
    pub call_to_action_direction: String,
}

impl StructuredOutput for CreativeStrategy {
    const SHAPE: &'static str = "CreativeStrategy";

    fn validate(&self) -> Result<(), String> {
        require_text("core_message", &self.core_message)?;
        require_text("creative_angle", &self.creative_angle)?;
        require_text("call_to_action_direction", &self.call_to_action_direction)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Label helpers
// ---------------------------------------------------------------------------

/// Lower-cases and collapses separators so `"Lead Generation"`,
/// `"lead-generation"` and `"LEAD_GENERATION"` compare equal.
pub(crate) fn normalise_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
