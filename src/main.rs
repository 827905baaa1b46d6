//! Sortbot CLI - Telegram file-sorting bot.
//!
//! A command-line interface for running the sortbot capture workflow.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use clap::{Args, Parser, Subcommand};
use sortbot::config::{config_path, init_config, load_config};
use sortbot::engine::CaptureEngine;
use sortbot::error::{BotError, Result};
use sortbot::pacer::IntervalPacer;
use sortbot::session::SessionStore;
use sortbot::telegram::{TelegramChannel, TelegramChannelConfig, TelegramTransport};
use std::process::ExitCode;
use std::sync::Arc;
use teloxide::Bot;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Sortbot - collects uploads and forwards them back in sorted order
#[derive(Parser)]
#[command(name = "sortbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot until interrupted
    Run,

    /// Initialize configuration
    Init(InitArgs),

    /// Show bot status and configuration
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Args)]
struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sortbot={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run => cmd_run().await,
        Commands::Init(args) => cmd_init(args).await,
        Commands::Status => cmd_status().await,
        Commands::Config(args) => cmd_config(args).await,
    }
}

/// Run the bot.
async fn cmd_run() -> Result<()> {
    let config = load_config().await?;

    let token = config
        .telegram
        .token
        .ok_or_else(|| BotError::config("no bot token; set BOT_TOKEN or run 'sortbot init'"))?;

    let mut channel_config = TelegramChannelConfig::new(&token)
        .allow_users(config.telegram.allow_from.iter().copied());
    if let Some(handle) = config.telegram.contact_handle {
        channel_config = channel_config.contact_handle(handle);
    }

    let bot = Bot::new(token);
    let store = Arc::new(SessionStore::new());
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let engine = Arc::new(CaptureEngine::with_pacer(
        store,
        transport,
        IntervalPacer::from_millis(config.replay.pace_ms),
    ));

    tracing::info!("starting bot");
    let channel = TelegramChannel::new(bot, channel_config, engine);
    channel.run().await
}

/// Initialize configuration.
async fn cmd_init(args: InitArgs) -> Result<()> {
    let config_file = config_path();

    if config_file.exists() && !args.force {
        println!("Configuration already exists at: {}", config_file.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    init_config()
        .await
        .map_err(|e| BotError::config(format!("failed to initialize config: {e}")))?;

    println!("Configuration created: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. export BOT_TOKEN=<token from @BotFather>");
    println!("  2. sortbot run");

    Ok(())
}

/// Show status.
async fn cmd_status() -> Result<()> {
    let config_file = config_path();

    println!("Sortbot Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match load_config().await {
        Ok(config) => {
            println!("  Valid:  yes");
            println!();
            println!("Telegram:");
            println!(
                "  Token:         {}",
                if config.telegram.token.is_some() {
                    "set"
                } else {
                    "-"
                }
            );
            println!(
                "  Allowed users: {}",
                if config.telegram.allow_from.is_empty() {
                    "everyone".to_string()
                } else {
                    config.telegram.allow_from.len().to_string()
                }
            );
            println!();
            println!("Replay:");
            println!("  Pace: {}ms", config.replay.pace_ms);
        }
        Err(e) => {
            println!("  Valid:  no ({e})");
        }
    }

    println!();
    println!("Environment:");
    print_env_status("BOT_TOKEN");
    print_env_status("TELEGRAM_BOT_TOKEN");
    print_env_status("ALLOWED_USER_IDS");

    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs) -> Result<()> {
    let config_file = config_path();

    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            if config_file.exists() {
                let content = tokio::fs::read_to_string(&config_file)
                    .await
                    .map_err(|e| BotError::config(format!("failed to read config: {e}")))?;
                println!("{content}");
            } else {
                println!("Configuration file does not exist.");
                println!("Run 'sortbot init' to create one.");
            }
        }
        ConfigCommands::Validate => {
            if !config_file.exists() {
                println!("error: configuration file does not exist");
                return Ok(());
            }

            match load_config().await {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("error: {e}"),
            }
        }
    }

    Ok(())
}

/// Print environment variable status.
fn print_env_status(name: &str) {
    let status = if std::env::var(name).is_ok() {
        "set"
    } else {
        "-"
    };
    println!("  {name}: {status}");
}
