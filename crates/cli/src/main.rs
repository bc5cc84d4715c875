mod handlers;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    ponte_adapter::{BotAdapter, EventRouter},
    ponte_config::PonteConfig,
    ponte_store::MessageStore,
};

#[derive(Parser)]
#[command(name = "ponte", about = "ponte — chat gateway bridge")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (skips discovery).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the gateway and bridge events until the connection ends.
    Run,
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the message_record schema if needed and verify the connection.
    Init,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "ponte starting");

    let mut config = match cli.config.as_deref() {
        Some(path) => ponte_config::load_config(path)?,
        None => ponte_config::discover_and_load(),
    };
    config.apply_env_fallback();

    match cli.command {
        Commands::Run => run_bridge(&config).await,
        Commands::Db {
            action: DbAction::Init,
        } => init_db(&config).await,
    }
}

async fn run_bridge(config: &PonteConfig) -> anyhow::Result<()> {
    let store = match config.database.url.as_deref() {
        Some(url) => Some(Arc::new(MessageStore::connect(url).await?)),
        None => {
            warn!("no database configured; message records will not be persisted");
            None
        },
    };

    let mut router = EventRouter::new();
    router.register(
        "private",
        Box::new(handlers::FriendMessageHandler::new(store.clone())),
    );
    router.register(
        "group",
        Box::new(handlers::GroupMessageHandler::new(store)),
    );
    info!(categories = ?router.categories(), "event handlers registered");

    let adapter = BotAdapter::new(
        config.gateway.url.clone(),
        config.gateway.token.clone(),
        router,
    );
    if let Err(e) = adapter.run().await {
        error!(error = %e, "bot adapter error");
        return Err(e.into());
    }

    info!("gateway connection closed, shutting down");
    Ok(())
}

async fn init_db(config: &PonteConfig) -> anyhow::Result<()> {
    let Some(url) = config.database.url.as_deref() else {
        anyhow::bail!("no database.url configured; nothing to initialize");
    };

    // connect() creates the schema; counting proves the table is queryable.
    let store = MessageStore::connect(url).await?;
    info!(records = store.count().await?, "message_record schema ready");
    Ok(())
}
