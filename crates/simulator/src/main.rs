//! Headless simulator binary.
//!
//! Wires the game service to in-memory repositories, loads a card catalog
//! and plays one scripted two-player generation, logging every domain event.
//!
//! # Configuration
//!
//! Read from the environment (a `.env` file is honored), see
//! [`RuntimeConfig::from_env`]. Without `TERRAFORM_CARD_CATALOG` the bundled
//! demo catalog is used.
//!
//! ```bash
//! RUST_LOG=sim=info,runtime=debug TERRAFORM_SHUFFLE_SEED=7 cargo run -p terraform-sim
//! ```

mod driver;

use std::sync::Arc;

use anyhow::{Context, Result};
use terraform_runtime::{CardOracleImpl, ChannelBroadcaster, GameService, RuntimeConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;

const DEMO_CATALOG: &str = include_str!("../assets/demo_cards.json");

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env();
    config.validate().context("invalid runtime configuration")?;

    let catalog = Arc::new(load_catalog(&config)?);
    info!(
        target: "sim",
        cards = catalog.len(),
        seed = ?config.shuffle_seed,
        max_actions = config.game.max_actions_per_turn,
        "simulator starting"
    );

    let broadcaster = Arc::new(ChannelBroadcaster::new(config.broadcast_buffer));
    let mut updates = broadcaster.subscribe();
    let service = GameService::new(
        config,
        Arc::new(terraform_runtime::InMemoryPlayerRepository::new()),
        Arc::new(terraform_runtime::InMemoryGameRepository::new()),
        catalog.clone(),
        broadcaster,
    );

    let mut driver = Driver::new(service, catalog, "sim-1");
    driver.setup(&["Ada", "Grace"]).await?;
    driver.choose_starting_cards().await?;
    driver.play_action_phase().await?;
    driver.finish_production().await?;
    driver.report()?;

    let mut delivered = 0usize;
    while updates.try_recv().is_ok() {
        delivered += 1;
    }
    info!(target: "sim", updates = delivered, "simulation finished");
    Ok(())
}

fn load_catalog(config: &RuntimeConfig) -> Result<CardOracleImpl> {
    match &config.card_catalog_path {
        Some(path) => CardOracleImpl::from_path(path)
            .with_context(|| format!("failed to load card catalog {}", path.display())),
        None => CardOracleImpl::from_json(DEMO_CATALOG).context("bundled demo catalog is invalid"),
    }
}

#[cfg(test)]
mod tests {
    use terraform_core::{CardKind, CardOracle};

    use super::*;

    #[test]
    fn demo_catalog_has_corporations_and_projects() {
        let catalog = CardOracleImpl::from_json(DEMO_CATALOG).unwrap();

        assert!(catalog.corporation_ids().len() >= 2);
        assert!(catalog.project_card_ids().len() >= 10);
        assert!(
            catalog
                .all_cards()
                .iter()
                .filter(|card| card.kind == CardKind::Corporation)
                .all(|card| card.starting_resources.is_some())
        );
    }

    #[tokio::test]
    async fn scripted_generation_reaches_the_next_action_phase() {
        let catalog = Arc::new(CardOracleImpl::from_json(DEMO_CATALOG).unwrap());
        let service = GameService::new(
            RuntimeConfig::default().with_shuffle_seed(3),
            Arc::new(terraform_runtime::InMemoryPlayerRepository::new()),
            Arc::new(terraform_runtime::InMemoryGameRepository::new()),
            catalog.clone(),
            Arc::new(terraform_runtime::NoopBroadcaster),
        );
        let games = service.games().clone();
        let mut driver = Driver::new(service, catalog, "test");

        driver.setup(&["Ada", "Grace"]).await.unwrap();
        driver.choose_starting_cards().await.unwrap();
        driver.play_action_phase().await.unwrap();
        driver.finish_production().await.unwrap();

        let game = games.get(&"test".into()).unwrap();
        assert_eq!(game.generation, 2);
        assert_eq!(game.phase, terraform_core::Phase::Action);
    }
}
