use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use facebook_client::FacebookClient;
use provolone_common::{Config, ProvoloneError, RunMode};
use provolone_bot::bot::Bot;
use provolone_bot::context::BotContext;
use provolone_bot::generation::ImageGenerator;
use provolone_bot::scheduling::Schedule;

#[derive(Parser)]
#[command(name = "provolone", about = "Turkey and provolone sandwich page bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// One cycle, or scheduled mode when RUN_MODE=schedule (default)
    Run,
    /// One cycle now, then post every 6h, check comments hourly, report daily
    Schedule,
    /// Write a venue report and exit
    Report,
    /// Submit a venue directly; it starts out pending
    AddVenue {
        name: String,
        #[arg(long, default_value = provolone_common::DEFAULT_LOCATION)]
        location: String,
        #[arg(long, default_value = provolone_common::DEFAULT_SPECIALTY)]
        specialty: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialise logging: {e}");
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Provolone bot stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("provolone=info".parse()?))
        .init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    info!("Provolone bot starting...");
    let config = Config::from_env()?;
    let ctx = BotContext::new(&config.data_dir)?;

    let facebook = Arc::new(FacebookClient::new(
        config.facebook_access_token.clone(),
        config.facebook_page_id.clone(),
    ));
    let images = ImageGenerator::from_config(&config);
    let command = cli.command.unwrap_or(Command::Run);

    if matches!(command, Command::Run | Command::Schedule) {
        verify_page(&facebook).await?;
    }

    let mut bot = Bot::new(ctx, facebook, images)
        .with_custom_message(config.custom_message.clone())
        .with_images(config.generate_images);

    match command {
        Command::Run if config.run_mode == RunMode::Single => {
            bot.run_once().await;
        }
        Command::Run | Command::Schedule => {
            bot.run_scheduled(Schedule::default()).await;
        }
        Command::Report => {
            if let Some(path) = bot.report() {
                println!("{}", path.display());
            }
        }
        Command::AddVenue {
            name,
            location,
            specialty,
        } => {
            if bot.add_venue(&name, &location, &specialty) {
                println!("Added {name} (pending review)");
            } else {
                println!("{name} is already listed");
            }
        }
    }
    Ok(())
}

/// The token must be able to read the page before anything is attempted.
async fn verify_page(facebook: &FacebookClient) -> Result<(), ProvoloneError> {
    match facebook.page_info().await {
        Ok(page) => {
            info!(page_id = %page.id, name = ?page.name, "Connected to page");
            Ok(())
        }
        Err(e) => Err(ProvoloneError::AuthenticationUnavailable(format!(
            "page {} is not reachable with the configured token: {e}",
            facebook.page_id()
        ))),
    }
}
