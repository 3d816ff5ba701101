use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod analysis;
mod app;
mod config;
mod error;
mod handler;
mod logging;
mod tui;
mod ui;

use analysis::{AnalysisClient, AnalysisRequest, ModelChoice};
use app::App;
use config::Config;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "sentiment")]
#[command(about = "Send text to a sentiment-analysis service and show what it says")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Analysis endpoint URL
    #[arg(short, long, env = "SENTIMENT_API_URL", global = true)]
    endpoint: Option<String>,

    /// Model the server should use
    #[arg(short, long, value_enum, global = true)]
    model: Option<ModelChoice>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one piece of text and print the result
    Analyze {
        /// Text to analyze
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_or_warn();

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::default()
    });
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    let model = config.resolve_model(cli.model);
    let client = AnalysisClient::new(&endpoint);

    match cli.command {
        Some(Commands::Analyze { text }) => analyze_once(&client, text, model).await,
        None => run_tui(client, model).await,
    }
}

async fn analyze_once(client: &AnalysisClient, text: String, model: ModelChoice) -> Result<()> {
    let request = AnalysisRequest { text, model };

    let result = client.analyze(&request).await?;
    for line in ui::result_lines(&result) {
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        println!("{}", text);
    }
    Ok(())
}

async fn run_tui(client: AnalysisClient, model: ModelChoice) -> Result<()> {
    info!(endpoint = client.endpoint(), "starting TUI");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let tx = events.sender();
    let mut app = App::new(client, model);

    let outcome: Result<()> = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event, &tx),
                None => break,
            }
        }
        Ok(())
    }
    .await;

    tui::restore()?;

    if let Err(e) = Config::save_default_model(app.model) {
        warn!(error = %e, "could not save selected model");
    }

    outcome
}
