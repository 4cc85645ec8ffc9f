//! Gambit CLI entry point: the thin controller in front of the dispatch core.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use gambit::infrastructure::logging::Logger;
use gambit::{
    AssistantError, ChessAssistant, Config, ConfigLoader, DispatchQueue, MistralClient, PlayerSide,
};

#[derive(Parser)]
#[command(name = "gambit", about = "Suggest a chess move from a board image", version)]
struct Cli {
    /// Path to the board image (JPEG)
    #[arg(long)]
    image: PathBuf,

    /// Side to suggest for: white or black
    #[arg(long)]
    side: PlayerSide,

    /// Optional config file (defaults to gambit.yaml + GAMBIT_* env)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config: Config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _logger = Logger::init(&config.logging)?;

    let image = std::fs::read(&cli.image)
        .with_context(|| format!("failed to read image {}", cli.image.display()))?;

    let provider = Arc::new(MistralClient::new(&config.provider, &config.retry)?);
    let queue = DispatchQueue::new(&config.queue);
    let assistant = ChessAssistant::new(provider, queue);

    match assistant.suggest_move(&image, cli.side).await {
        Ok(suggestion) => {
            if cli.json {
                println!("{}", serde_json::json!({ "suggestion": suggestion }));
            } else {
                println!("{suggestion}");
            }
            Ok(())
        }
        Err(err @ AssistantError::Overloaded) => Err(anyhow::anyhow!(err)),
        Err(AssistantError::Api(err)) => {
            let status = err
                .status()
                .map_or_else(String::new, |s| format!(" (upstream status {s})"));
            Err(anyhow::anyhow!("{err}{status}"))
        }
    }
}
