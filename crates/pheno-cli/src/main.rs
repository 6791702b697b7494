mod app;
mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use pheno_core::catalog::Catalog;
use pheno_core::config::Config;
use pheno_exec::GeminiClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phenogram", version, about = "Drive a Phenogram session from the terminal")]
struct Cli {
    /// Config file (defaults to <config dir>/phenogram/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Generative API key; overrides GEMINI_API_KEY / API_KEY and the config file
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// Model name for the assistant and captions
    #[arg(long, global = true)]
    model: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session reading commands from stdin
    Run,
    /// Print the demo catalog
    Catalog {
        #[arg(long)]
        json: bool,
    },
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("phenogram").join("config.toml"))
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().or_else(default_config_path);
    let mut config = match path {
        Some(path) => Config::load_from(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let env_key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .ok()
        .filter(|key| !key.is_empty());
    if let Some(key) = cli.api_key.clone().or(env_key) {
        config.assistant.api_key = Some(key);
    }
    if let Some(model) = cli.model.clone() {
        config.assistant.model = model;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Logs go to stderr so stdout stays readable as a transcript.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.session.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            if config.assistant.api_key.is_none() {
                tracing::warn!("no API key set; assistant and captions will use fallback text");
            }
            let genai = GeminiClient::new(&config.assistant).context("building HTTP client")?;
            app::run(config, Arc::new(genai)).await?;
        }
        Command::Catalog { json } => {
            let catalog = Catalog::demo();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                print!("{}", render::catalog(&catalog));
            }
        }
    }

    Ok(())
}
