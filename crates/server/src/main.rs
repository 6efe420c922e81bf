//! Monster AI server binary.
//!
//! Loads content, populates the map with its spawns and runs the simulation
//! until interrupted. World events are logged under the `server::events`
//! target.
mod config;
mod world;

use anyhow::Result;
use runtime::{Event, Runtime, RuntimeConfig, Topic};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use config::ServerConfig;
use world::World;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let server_config = ServerConfig::from_env();
    let runtime_config = RuntimeConfig::from_env()?;
    info!(
        data_dir = %server_config.data_dir.display(),
        think_interval_ms = runtime_config.think_interval_ms,
        "Starting monster server"
    );

    let world = World::load(&server_config)?;
    let runtime = Runtime::builder()
        .config(runtime_config)
        .oracles(world.oracles.clone())
        .build()
        .await?;
    let handle = runtime.handle();

    let spawned = world.populate(&handle).await?;
    info!(spawned, "map populated");

    let logger = tokio::spawn(log_events(handle.subscribe(Topic::World)));
    let rewards = tokio::spawn(log_events(handle.subscribe(Topic::Rewards)));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    drop(handle);
    runtime.shutdown().await?;
    logger.abort();
    rewards.abort();
    Ok(())
}

async fn log_events(mut rx: tokio::sync::broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(Event::World(record)) => {
                debug!(target: "server::events", tick = %record.tick, event = ?record.event, "world event");
            }
            Ok(Event::RewardStored(stored)) => {
                info!(
                    target: "server::events",
                    player_guid = stored.player_guid,
                    boss = %stored.boss_name,
                    items = stored.item_count,
                    "reward stored"
                );
            }
            Ok(Event::TickCompleted(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "server::events", skipped, "event logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
