//! Ethos CLI - Terminal chat with personality presets

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ethos_core::prelude::*;

mod repl;

#[derive(Parser)]
#[command(name = "ethos")]
#[command(about = "Chat with an LLM through personality presets", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file, merged over ethos.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Wait for the full reply instead of streaming tokens
        #[arg(long)]
        no_stream: bool,
    },
    /// Ask a single question and print the reply
    Ask {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Prompt text
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List available personalities
    Personalities,
    /// List supported models
    Models,
    /// Version information
    Version,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Personality id (see `ethos personalities`)
    #[arg(short, long)]
    personality: Option<String>,

    /// Model id (see `ethos models`)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature, overriding the personality default
    #[arg(short, long, value_parser = repl::parse_temperature)]
    temperature: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with chat output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("ethos {}", env!("CARGO_PKG_VERSION"));
            println!("ethos-core {}", ethos_core::VERSION);
        }
        Commands::Models => {
            let config = load_config(cli.config.as_deref())?;
            for model in GroqModel::ALL {
                let marker = if model == config.llm.model { "*" } else { " " };
                println!("{} {:<26} {}", marker, model.as_str(), model.description());
            }
        }
        Commands::Personalities => {
            let config = load_config(cli.config.as_deref())?;
            let catalog = config.personality.load_catalog()?;
            for personality in catalog.iter() {
                println!(
                    "{:<24} {} (temperature {:.2})",
                    personality.id,
                    personality.label(),
                    personality.temperature
                );
                if !personality.description.is_empty() {
                    println!("{:<24} {}", "", personality.description);
                }
            }
        }
        Commands::Chat {
            selection,
            no_stream,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let manager = build_manager(&config, &selection)?;
            let options = repl::ReplOptions {
                stream: !no_stream,
                export_dir: config.export.directory.clone(),
            };
            repl::run(manager, options).await?;
        }
        Commands::Ask { selection, prompt } => {
            let config = load_config(cli.config.as_deref())?;
            let mut manager = build_manager(&config, &selection)?;
            let reply = manager
                .session_mut()
                .complete(&prompt.join(" "))
                .await
                .context("Request failed")?;

            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", reply)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<EthosConfig> {
    let config = EthosConfig::load_with(path).context("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

fn build_manager(config: &EthosConfig, args: &SelectionArgs) -> Result<SessionManager> {
    let provider = GroqProvider::from_config(&config.llm)
        .context("Failed to create Groq provider")?;
    let catalog = config
        .personality
        .load_catalog()
        .context("Failed to load personality catalog")?;

    let model = match &args.model {
        Some(id) => id.parse::<GroqModel>()?,
        None => config.llm.model,
    };
    let personality = args
        .personality
        .clone()
        .unwrap_or_else(|| config.personality.default_id(&catalog).to_string());

    let mut manager = SessionManager::new(
        catalog,
        Arc::new(provider),
        config.conversation.clone(),
        &personality,
        model,
    )?;

    if let Some(temperature) = args.temperature {
        manager.set_temperature(temperature);
    }

    Ok(manager)
}
