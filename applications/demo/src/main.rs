/// Harmony demo - scripted playback session over a simulated engine
use clap::Parser;
use harmony_core::CatalogProvider;
use harmony_demo::{config::DemoConfig, engine::SimulatedEngine, session};
use harmony_playback::{notification_channel, PlayerService};
use harmony_storage::{SqliteActivityLog, SqliteLikedStore, StaticCatalog};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "harmony-demo")]
#[command(about = "Run a scripted Harmony listening session", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./harmony.toml if present)
    #[arg(short, long, env = "HARMONY_CONFIG")]
    config: Option<PathBuf>,

    /// How long the session runs
    #[arg(short, long, default_value_t = 20)]
    seconds: u64,

    /// Override the configured database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harmony_demo=info,harmony_playback=info,harmony_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = DemoConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.storage.database_url = url;
    }
    config.validate()?;

    tracing::info!("Starting Harmony demo");
    tracing::info!("Database: {}", config.storage.database_url);

    // Initialize database
    let pool = harmony_storage::create_pool(&config.storage.database_url).await?;
    harmony_storage::run_migrations(&pool).await?;
    let liked_store = Arc::new(SqliteLikedStore::new(pool.clone(), config.storage.user_id.clone()));
    let activity_log = Arc::new(SqliteActivityLog::new(pool.clone(), config.storage.user_id.clone()));

    // Catalog
    let provider = match &config.storage.catalog_path {
        Some(path) => StaticCatalog::from_json_file(path).await?,
        None => StaticCatalog::demo(),
    };
    let catalog = provider.get_catalog().await?;
    tracing::info!("Catalog loaded: {} songs", catalog.len());

    // Player
    let (notifier, engine_events) = notification_channel();
    let engine = SimulatedEngine::new(config.engine, notifier);
    let (service, handle) = PlayerService::new(
        Box::new(engine),
        engine_events,
        liked_store,
        config.playback.clone(),
    );
    let player = service.with_activity_sink(activity_log.clone()).spawn();

    let outcome = session::run(&handle, &catalog, cli.seconds).await;

    handle.shutdown().await?;
    player.await?;

    let recent = activity_log.recent_activities(5).await?;
    println!("Recent activity:");
    for activity in recent {
        let title = catalog
            .get(&activity.song_id)
            .map_or("(unknown)", |song| song.title.as_str());
        println!(
            "  {} {} {}",
            activity.occurred_at.format("%H:%M:%S"),
            activity.kind.as_str(),
            title
        );
    }

    pool.close().await;
    outcome?;
    Ok(())
}
