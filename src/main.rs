//! prsumma CLI - pull request summarisation service
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, wiring components together and handling top-level errors.

use clap::{Parser, Subcommand};
use colored::Colorize;
use prsumma::agent::OllamaModel;
use prsumma::github::GitHubClient;
use prsumma::server::{self, AppError};
use prsumma::storage::{PostgresStore, StoreOutcome};
use prsumma::{AppState, Config};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "prsumma")]
#[command(author, version, about = "Summarise GitHub pull requests with a local LLM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Port to listen on, overriding PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Summarise a single pull request and print the result
    Summarise {
        /// Pull request number
        #[arg(allow_negative_numbers = true)]
        pr_number: i64,
        /// Also insert the summary into the database
        #[arg(long)]
        store: bool,
    },
}

/// Build the shared state; the model is loaded here, once.
async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let github = GitHubClient::new(&config.github)?;
    // Load the model up front so requests never pay for it
    let model = OllamaModel::load(&config.model).await?;
    let store = PostgresStore::new(config.database.clone());

    Ok(Arc::new(AppState {
        github: Arc::new(github),
        model: Arc::new(model),
        store: Arc::new(store),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    // Environment is read once; every component gets its slice of it
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            info!("Starting PR summary service");
            let state = build_state(&config).await?;
            server::serve(state, port.unwrap_or(config.server.port)).await?;
        }
        Commands::Summarise { pr_number, store } => {
            let state = build_state(&config).await?;

            let summarised = match server::summarise_pull_request(&state, pr_number, store).await {
                Ok(summarised) => summarised,
                Err(AppError::NotFound) => {
                    anyhow::bail!(
                        "pull request #{} not found in {}/{}",
                        pr_number,
                        config.github.owner,
                        config.github.repo
                    )
                }
                Err(e) => return Err(e.into()),
            };

            // Print the summary, then what happened to it
            println!("{}\n", format!("=== PR #{} ===", pr_number).bold());
            println!("{}", summarised.record.summary);

            match summarised.store {
                Some(StoreOutcome::Stored) => println!("\n{}", "Stored in model_responses".green()),
                Some(StoreOutcome::Failed { reason }) => {
                    println!("\n{} {}", "Not stored:".yellow(), reason)
                }
                None => {}
            }
        }
    }

    Ok(())
}
