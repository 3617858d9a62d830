//! CLI entrypoint for skipvote
//!
//! Wires the layers together: configuration, scheduler negotiation,
//! simulated host, console presenter, skip history, and the coordinator.

mod demo;
mod repl;

use anyhow::Result;
use clap::Parser;
use skipvote_application::{
    NoPersistence, NoPresentation, PersistencePort, PresentationPort, VoteCoordinator,
};
use skipvote_domain::{ParticipantId, WorldId};
use skipvote_infrastructure::{negotiate, ConfigLoader, HostModel, JsonlSkipLog, SimulatedHost};
use skipvote_presentation::{Cli, ConsolePresenter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Keep the appender guard alive for the process lifetime.
    let _log_guard = match &cli.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            None
        }
    };

    info!("Starting skipvote");

    // Configuration
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    file_config.validate()?;

    let model: HostModel = match &cli.host_model {
        Some(raw) => raw
            .parse()
            .map_err(|message: String| anyhow::anyhow!(message))?,
        None => file_config.host.model,
    };

    let world = WorldId::new(cli.world.clone());
    let mut coordinator_config = file_config.to_coordinator_config();
    // The simulated world is usable out of the box unless the config
    // explicitly mentions it.
    if !file_config.worlds.contains_key(world.as_str()) {
        coordinator_config.enable_world(&world);
    }

    // === Dependency Injection ===
    let negotiated = negotiate(model);

    let host = Arc::new(SimulatedHost::new());
    host.add_world(&world);
    // Start mid-night so a vote round can begin immediately.
    host.set_time(&world, 13_000);
    if let Some(regions) = negotiated.regions() {
        regions.register_world(&world);
    }
    for i in 1..=cli.players {
        let participant = ParticipantId::new(format!("p{i}"));
        host.join(&world, &participant);
        if let Some(regions) = negotiated.regions() {
            regions.register_participant(&participant);
        }
    }

    let presentation: Arc<dyn PresentationPort> = if cli.quiet {
        Arc::new(NoPresentation)
    } else {
        Arc::new(ConsolePresenter::new())
    };

    let history_path: Option<PathBuf> = cli.history.clone().or_else(|| {
        file_config
            .storage
            .history
            .then(|| {
                file_config
                    .storage
                    .path
                    .clone()
                    .map_or_else(|| PathBuf::from("skipvote-history.jsonl"), PathBuf::from)
            })
    });
    let persistence: Arc<dyn PersistencePort> = match &history_path {
        Some(path) => match JsonlSkipLog::new(path) {
            Some(log) => {
                info!("skip history: {}", log.path().display());
                Arc::new(log)
            }
            None => Arc::new(NoPersistence),
        },
        None => Arc::new(NoPersistence),
    };

    let coordinator = VoteCoordinator::builder(negotiated.port(), host.clone(), host.clone())
        .config(coordinator_config)
        .presentation(presentation)
        .persistence(persistence)
        .build();

    let ctx = repl::ReplContext {
        coordinator: coordinator.clone(),
        host,
        regions: negotiated.regions().cloned(),
        world,
    };

    if cli.demo {
        let skip_delay = Duration::from_secs(file_config.skip.delay_seconds);
        demo::run(&ctx, skip_delay).await;
    } else {
        repl::run(&ctx);
    }

    coordinator.shutdown();
    Ok(())
}
