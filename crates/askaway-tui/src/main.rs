use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;

use askaway_core::{
    ChatSession, CompletionsClient, Config, FileStore, HistoryStore, MemoryStore, Provider,
    DEFAULT_GREETING,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "askaway")]
#[command(version)]
#[command(about = "Ask questions about your documents from the terminal")]
struct Cli {
    /// Backend protocol: gateway or completions
    #[arg(long, global = true)]
    provider: Option<String>,
    /// Backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Model name (completions provider only)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat window (default)
    Chat,
    /// Ask one question and print the reply
    Ask {
        /// Your question
        question: String,
    },
    /// Show past questions, newest first
    History {
        /// Maximum number of entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Forget all saved history
    ClearHistory,
    /// List models offered by a completions backend
    Models,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(provider) = cli.provider {
        config.provider = Some(provider);
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = Some(base_url);
    }
    if let Some(model) = cli.model {
        config.model = Some(model);
    }

    // Neither a missing data dir nor a broken log dir stops the program
    let data_dir = config.data_dir().ok();
    let _log_guard = logging::try_init_logging(data_dir.map(|dir| dir.join("logs")).as_deref());

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_tui(&config).await?,
        Commands::Ask { question } => return ask(&config, &question).await,
        Commands::History { limit } => show_history(&config, limit)?,
        Commands::ClearHistory => clear_history(&config)?,
        Commands::Models => list_models(&config).await?,
    }

    Ok(ExitCode::SUCCESS)
}

/// History on disk, or kept in memory for this run when there is no data dir
fn history_store(config: &Config) -> HistoryStore {
    match config.data_dir() {
        Ok(dir) => {
            tracing::info!("Using data directory {}", dir.display());
            HistoryStore::new(FileStore::new(dir))
        }
        Err(e) => {
            tracing::warn!("History will not be saved: {}", e);
            HistoryStore::new(MemoryStore::new())
        }
    }
}

fn build_session(config: &Config) -> Result<ChatSession> {
    let provider = config.provider()?;
    let base_url = config.base_url()?;
    tracing::info!("Connecting to {} backend at {}", provider.as_str(), base_url);

    let backend = provider.backend(
        &base_url,
        config.model.clone(),
        config.api_key.clone(),
        config.request_timeout(),
    );
    Ok(ChatSession::new(backend, history_store(config)))
}

async fn run_tui(config: &Config) -> Result<()> {
    let session = build_session(config)?.with_greeting(DEFAULT_GREETING);
    let label = format!("{} @ {}", config.provider()?.display_name(), config.base_url()?);
    let mut app = App::new(session, label);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(config: &Config, question: &str) -> Result<ExitCode> {
    let mut session = build_session(config)?;

    let reply = session.send_message(question).await?;

    if reply.error {
        println!("{}", reply.text().red());
        println!("Check that the backend is running at {}", config.base_url()?.bold());
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", reply.text());
    if !reply.sources.is_empty() {
        println!("\n{}", "Sources:".bold().blue());
        for source in &reply.sources {
            println!("  • {}", source.magenta());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn show_history(config: &Config, limit: Option<usize>) -> Result<()> {
    let entries = history_store(config).load();

    if entries.is_empty() {
        println!("{}", "No history yet".yellow());
        return Ok(());
    }

    println!("\n{}", "Recent questions".bold().blue());
    println!("{}", "=".repeat(40).dimmed());

    for (i, entry) in entries.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
        println!(
            "{}. {} {}",
            (i + 1).to_string().bold().blue(),
            entry.query.bold().yellow(),
            entry.timestamp.dimmed()
        );
        println!("   {}\n", entry.response);
    }

    Ok(())
}

fn clear_history(config: &Config) -> Result<()> {
    match history_store(config).clear() {
        Ok(()) => println!("{}", "History cleared".green()),
        Err(e) => {
            tracing::warn!("Failed to remove persisted history: {}", e);
            println!("{}: {}", "Could not remove saved history".red(), e);
        }
    }
    Ok(())
}

async fn list_models(config: &Config) -> Result<()> {
    let provider = config.provider()?;
    if provider != Provider::Completions {
        return Err(anyhow!(
            "Listing models needs the completions provider (current: {})",
            provider.as_str()
        ));
    }

    let client = CompletionsClient::with_timeout(&config.base_url()?, config.request_timeout())
        .api_key(config.api_key.clone());

    println!("\n{}", "Available models".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    match client.list_models().await {
        Ok(models) if models.is_empty() => println!("{}", "The backend reported no models".yellow()),
        Ok(models) => {
            for model in models {
                println!("  • {}", model.green());
            }
        }
        Err(e) => {
            tracing::warn!("Listing models failed: {}", e);
            println!("{}: {}", "Error contacting backend".red(), e);
        }
    }

    Ok(())
}
