//! `adscript` subcommands.
//!
//! The CLI plays the part of the wizard front-end: `generate` runs the
//! draft-and-refine pipeline (and optionally variations) on a fresh
//! [`CampaignSession`]; `variations` reloads a saved session or workflow
//! state and runs variation generation on it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use llm::{OpenAiConfig, OpenAiProvider};
use nodes::{AdScriptPipelines, LlmGateway};
use pipeline::{
    AdPlatform, AgentState, CampaignBrief, CampaignGoal, CampaignSession, LlmProvider, ModelId,
    ScriptFormat,
};
use serde::Deserialize;
use tracing::info;

use crate::config::AppConfig;
use crate::render;

#[derive(Debug, Parser)]
#[command(
    name = "adscript",
    version,
    about = "Draft, review, refine and A/B-vary ad scripts with an LLM"
)]
pub struct Cli {
    /// Path to the config file [default: .adscript/config.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a reviewed script from a campaign brief
    Generate(GenerateArgs),
    /// Generate three A/B-test variants from a saved workflow result
    Variations {
        /// Session or workflow JSON written by `generate --output`
        #[arg(long)]
        input: PathBuf,
        /// Write the updated session as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration with the API key redacted
    Config,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Read the brief from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["product", "description", "audience"])]
    pub brief: Option<PathBuf>,

    #[arg(long, required_unless_present = "brief")]
    pub product: Option<String>,

    #[arg(long, required_unless_present = "brief")]
    pub description: Option<String>,

    #[arg(long, required_unless_present = "brief")]
    pub audience: Option<String>,

    /// Key benefit (repeatable)
    #[arg(long = "benefit")]
    pub benefits: Vec<String>,

    #[arg(long)]
    pub brand_voice: Option<String>,

    #[arg(long)]
    pub context: Option<String>,

    /// video or static
    #[arg(long, default_value = "video")]
    pub format: ScriptFormat,

    #[arg(long, default_value = "brand_awareness")]
    pub goal: CampaignGoal,

    #[arg(long, default_value = "meta")]
    pub platform: AdPlatform,

    /// Also generate A/B-test variants of the resulting script
    #[arg(long)]
    pub variations: bool,

    /// Write the session results as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    fn load_brief(&self) -> anyhow::Result<CampaignBrief> {
        let brief = match &self.brief {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read brief {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("cannot parse brief {}", path.display()))?
            }
            None => CampaignBrief {
                product_name: self.product.clone().unwrap_or_default(),
                product_description: self.description.clone().unwrap_or_default(),
                target_audience: self.audience.clone().unwrap_or_default(),
                key_benefits: self.benefits.clone(),
                brand_voice: self.brand_voice.clone(),
                additional_context: self.context.clone(),
                format: self.format,
            },
        };
        brief.validate().map_err(|msg| anyhow::anyhow!("invalid brief: {msg}"))?;
        Ok(brief)
    }
}

/// Builds both pipelines on the configured OpenAI-compatible provider.
pub fn build_pipelines(config: &AppConfig) -> anyhow::Result<AdScriptPipelines> {
    let api_key = config.llm.resolve_api_key()?;
    let provider = OpenAiProvider::new(
        OpenAiConfig::new(api_key)
            .with_base_url(config.llm.base_url.clone())
            .with_timeout(config.llm.timeout()),
    )?;
    pipelines_on(Arc::new(provider), config)
}

/// Builds both pipelines on an arbitrary provider.
pub fn pipelines_on(
    provider: Arc<dyn LlmProvider>,
    config: &AppConfig,
) -> anyhow::Result<AdScriptPipelines> {
    let model = ModelId::new(config.llm.model.clone()).context("llm.model must not be empty")?;
    let gateway = LlmGateway::new(provider, model).with_json_mode(config.llm.json_mode);
    Ok(AdScriptPipelines::new(&gateway)?)
}

pub async fn generate(
    args: &GenerateArgs,
    pipelines: &AdScriptPipelines,
    out: &mut impl Write,
) -> anyhow::Result<CampaignSession> {
    let brief = args.load_brief()?;
    let mut session = CampaignSession::new();
    info!(session = %session.id, product = %brief.product_name, "Starting campaign");

    let state = AgentState::new(args.goal, args.platform, brief);
    let result = pipelines.generate_for_session(&mut session, state).await?;
    writeln!(out, "{}", render::workflow(result))?;

    if args.variations {
        let result = pipelines.variations_for_session(&mut session).await?;
        if let Some(variants) = &result.final_scripts_variants {
            writeln!(out, "\n{}", render::variants(variants))?;
        }
    }

    if let Some(path) = &args.output {
        save_session(&session, path)?;
        writeln!(out, "\nSaved session to {}", path.display())?;
    }
    Ok(session)
}

/// What `variations --input` accepts.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedInput {
    Session(Box<CampaignSession>),
    Workflow(Box<AgentState>),
}

pub async fn variations(
    input: &Path,
    output: Option<&Path>,
    pipelines: &AdScriptPipelines,
    out: &mut impl Write,
) -> anyhow::Result<CampaignSession> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let saved: SavedInput = serde_json::from_str(&text).with_context(|| {
        format!(
            "{} is neither a saved session nor a workflow state",
            input.display()
        )
    })?;

    let mut session = match saved {
        SavedInput::Session(session) => *session,
        SavedInput::Workflow(state) => {
            let mut session = CampaignSession::new();
            session.record_workflow(*state);
            session
        }
    };
    session.clear_variations();

    let result = pipelines.variations_for_session(&mut session).await?;
    if let Some(variants) = &result.final_scripts_variants {
        writeln!(out, "{}", render::variants(variants))?;
    }

    if let Some(path) = output {
        save_session(&session, path)?;
        writeln!(out, "\nSaved session to {}", path.display())?;
    }
    Ok(session)
}

pub fn show_config(config: &AppConfig, out: &mut impl Write) -> anyhow::Result<()> {
    write!(out, "{}", config.to_redacted_toml()?)?;
    Ok(())
}

fn save_session(session: &CampaignSession, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))
}
