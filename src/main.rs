use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod application;
mod domain;
mod infrastructure;

use application::errors::BotError;
use application::messaging::InvocationParser;
use application::services::{CommandService, StateService, SyncService};
use domain::entities::{CommandRegistry, User};
use domain::traits::Bot;
use infrastructure::adapters::console::ConsoleAdapter;
use infrastructure::adapters::discord::{DiscordAdapter, GatewayEvent, GatewaySession};
use infrastructure::config::Config;
use infrastructure::storage::JsonStateStore;

#[derive(Parser)]
#[command(name = "prefs-bot")]
#[command(about = "A Discord bot that keeps per-user notification preferences", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Discord bot (needs DISCORD_BOT_TOKEN)
    Run,
    /// Drive the command handlers from stdin (dev mode)
    Console {
        /// Act as a server administrator
        #[arg(long)]
        admin: bool,
        /// User id to invoke commands as
        #[arg(long, default_value = "console")]
        user: String,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Console { admin, user } => run_console(&cli.config, user, admin),
        Commands::Version => {
            println!("prefs-bot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(),
    }
}

fn run_bot(config_path: &str) -> ExitCode {
    let config = Config::load_or_default(config_path);

    // Refuse to start without a token, before touching the network
    let token = match config.require_token() {
        Ok(token) => token.to_string(),
        Err(e) => {
            tracing::error!("❌ {}!", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting {}", config.bot.name);
    block_on(run_discord_bot(config, token))
}

fn run_console(config_path: &str, user: String, admin: bool) -> ExitCode {
    let config = Config::load_or_default(config_path);
    block_on(run_console_bot(config, user, admin))
}

fn block_on(bot: impl std::future::Future<Output = Result<(), BotError>>) -> ExitCode {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(bot) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_state(config: &Config) -> Result<Arc<StateService>, BotError> {
    let store = Arc::new(JsonStateStore::new(&config.storage.path));
    let state = StateService::load(store).await?;
    Ok(Arc::new(state))
}

/// How the Discord event loop ended
enum Exit {
    Interrupted,
    EventsClosed,
    GatewayStopped(Result<Result<(), BotError>, tokio::task::JoinError>),
}

async fn run_discord_bot(config: Config, token: String) -> Result<(), BotError> {
    let state = load_state(&config).await?;

    let adapter = Arc::new(DiscordAdapter::new(&config.discord, token.clone()));
    let sync = Arc::new(SyncService::new(CommandRegistry::declared(), adapter.clone()));
    let commands = Arc::new(CommandService::new(state, sync.clone()));

    let (events, mut inbox) = mpsc::channel(64);
    let session = GatewaySession::new(&config.discord, token, config.bot.name.clone());
    let mut gateway: JoinHandle<Result<(), BotError>> = tokio::spawn(session.run(events));

    tracing::info!("Starting event loop...");

    let exit = loop {
        tokio::select! {
            event = inbox.recv() => {
                let Some(event) = event else { break Exit::EventsClosed };
                match event {
                    GatewayEvent::Ready(ready) => {
                        adapter.set_ready(&ready);
                        tracing::info!("✅ Logged in as {} ({})", ready.user.tag(), ready.user.id);

                        let sync = sync.clone();
                        tokio::spawn(async move {
                            sync.sync_on_ready().await;
                        });
                    }
                    GatewayEvent::Interaction(interaction) => {
                        let Some(invocation) = adapter.to_invocation(&interaction) else { continue };

                        let adapter = adapter.clone();
                        let commands = commands.clone();
                        tokio::spawn(async move {
                            let reply = commands.handle(&invocation).await;
                            if let Err(e) = adapter.respond(&invocation, &reply).await {
                                tracing::error!("Failed to reply to /{}: {}", invocation.name, e);
                            }
                        });
                    }
                }
            }
            joined = &mut gateway => break Exit::GatewayStopped(joined),
            _ = tokio::signal::ctrl_c() => break Exit::Interrupted,
        }
    };

    let joined = match exit {
        Exit::Interrupted => {
            tracing::info!("Shutting down");
            gateway.abort();
            return Ok(());
        }
        Exit::EventsClosed => gateway.await,
        Exit::GatewayStopped(joined) => joined,
    };

    joined.map_err(|e| BotError::Gateway(e.to_string()))?
}

async fn run_console_bot(config: Config, user: String, admin: bool) -> Result<(), BotError> {
    let state = load_state(&config).await?;

    let bot = Arc::new(ConsoleAdapter::new());
    let registry = CommandRegistry::declared();
    let sync = Arc::new(SyncService::new(registry.clone(), bot.clone()));
    let commands = CommandService::new(state, sync.clone());
    let parser = InvocationParser::new(&config.bot.prefix, registry);
    let invoker = User::new(user).with_administrator(admin);

    let info = bot.bot_info();
    tracing::info!("{} started as @{} ({})", info.name, info.username, info.id);
    sync.sync_on_ready().await;

    let mut lines = ConsoleAdapter::stdin_lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parser.parse(line, invoker.clone()) {
            Some(invocation) => {
                let invocation = invocation.with_platform("console");
                let reply = commands.handle(&invocation).await;
                bot.respond(&invocation, &reply).await?;
            }
            None => println!("[BOT] Try /settings true, /settings false or /reload"),
        }
    }

    Ok(())
}

fn init_config() -> ExitCode {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to render config: {}", e);
            ExitCode::FAILURE
        }
    }
}
