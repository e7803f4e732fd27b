use std::io::{IsTerminal, Read};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use optimizer_core::view::{OutputPanel, COPY_FEEDBACK, PENDING_LABEL};
use optimizer_core::{
    ContextMode, Language, Length, Multimodal, RequestParameters, Tone, DEFAULT_TARGET_MODEL,
    LATENCY_RANGE_MS, TOKEN_BUDGET_RANGE,
};
use optimizer_suggest::{LlmGenerator, Session};

mod clipboard;
mod display;

#[derive(Parser)]
#[command(name = "prompt-optimizer")]
#[command(about = "Turn a basic prompt into an optimized, production-ready one", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a prompt
    Optimize(OptimizeArgs),
    /// Show or change the AI provider settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings (the API key is never shown)
    Show,
    /// Update provider, model and optionally the API key
    Set {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        /// Leave empty to keep the stored key
        #[arg(long, default_value = "")]
        api_key: String,
    },
}

#[derive(Args)]
struct OptimizeArgs {
    /// Original prompt; read from stdin when omitted
    prompt: Option<String>,
    #[arg(long, default_value = DEFAULT_TARGET_MODEL)]
    target_model: String,
    /// es, en or fr
    #[arg(long, default_value_t = Language::default())]
    language: Language,
    /// neutral, technical, close or formal
    #[arg(long, default_value_t = Tone::default())]
    tone: Tone,
    /// short, medium or long
    #[arg(long, default_value_t = Length::default())]
    length: Length,
    /// json, xml, yaml or natural
    #[arg(long, default_value_t = ContextMode::default())]
    context_mode: ContextMode,
    /// none, image_analyze, image_generate or audio
    #[arg(long, default_value_t = Multimodal::default())]
    multimodal: Multimodal,
    #[arg(long, default_value = "")]
    guardrails: String,
    /// Suggest grounding with fresh search data
    #[arg(long)]
    fresh_data: bool,
    #[arg(long, default_value_t = 2500, value_parser = clap::value_parser!(u32).range(*LATENCY_RANGE_MS.start() as i64..=*LATENCY_RANGE_MS.end() as i64))]
    latency_ms: u32,
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u32).range(*TOKEN_BUDGET_RANGE.start() as i64..=*TOKEN_BUDGET_RANGE.end() as i64))]
    token_budget: u32,
    /// Copy the optimized prompt to the clipboard
    #[arg(long)]
    copy: bool,
    /// Print the structured result as JSON
    #[arg(long)]
    json: bool,
}

impl OptimizeArgs {
    fn into_parameters(self, input_prompt: String) -> RequestParameters {
        RequestParameters {
            input_prompt,
            target_model: self.target_model,
            language: self.language,
            tone: self.tone,
            length: self.length,
            context_mode: self.context_mode,
            multimodal: self.multimodal,
            guardrails_extra: self.guardrails,
            requires_fresh_data: self.fresh_data,
            latency_max_ms: self.latency_ms,
            token_budget: self.token_budget,
        }
    }
}

fn read_prompt(arg: Option<String>) -> Result<String> {
    if let Some(p) = arg {
        return Ok(p);
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .context("failed to read prompt from stdin")?;
    Ok(buf)
}

/// Shown on stderr while the single generation call is in flight.
fn submission_banner() -> &'static str {
    PENDING_LABEL
}

async fn optimize(args: OptimizeArgs) -> Result<()> {
    let prompt = read_prompt(args.prompt.clone())?;
    let (copy, json) = (args.copy, args.json);
    let mut session = Session::new(args.into_parameters(prompt));

    eprintln!("{}", submission_banner());
    session.submit(&LlmGenerator::new()).await?;

    match session.view().output() {
        OutputPanel::Result(result) if json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputPanel::Result(result) => display::print_result(result),
        OutputPanel::Error(message) => bail!("{message}"),
        OutputPanel::Placeholder(text) => println!("{text}"),
        OutputPanel::Loading => bail!("submission did not complete"),
    }

    if copy {
        let mut cb = clipboard::SystemClipboard::new()?;
        let now = Instant::now();
        if session.copy(&mut cb, now)? {
            eprintln!("{}", display::copy_feedback(session.view().copy_label(now)));
            // Stay alive through the confirmation window so clipboard
            // managers can take ownership of the selection.
            tokio::time::sleep(COPY_FEEDBACK).await;
        } else {
            eprintln!("nothing to copy");
        }
    }
    Ok(())
}

fn settings(action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = optimizer_core::resolve_settings();
            println!("provider:   {}", settings.provider);
            println!("model:      {}", settings.model);
            println!("key set:    {}", !settings.api_key.is_empty());
            println!("configured: {}", optimizer_core::ai_configured(&settings));
        }
        SettingsAction::Set {
            provider,
            model,
            api_key,
        } => {
            let mut settings = optimizer_core::read_settings();
            settings.provider = provider;
            settings.model = model;
            if !api_key.is_empty() {
                settings.api_key = api_key;
            }
            optimizer_core::write_settings(&settings)?;
            println!("saved {}", optimizer_core::settings_path().display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize(args) => optimize(args).await?,
        Commands::Settings { action } => settings(action)?,
    }

    Ok(())
}
