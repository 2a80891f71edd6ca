mod config;
mod console;
mod host;
mod permissions;
mod runtime;

use std::sync::Arc;

use config::ServerConfig;
use console::Console;
use host::ServerHost;
use permissions::PermissionManager;
use rtp_command::rtp::{CooldownLedger, RtpHandler, RtpReport};
use rtp_command::CommandRegistry;
use rtp_world::World;
use tokio::io::AsyncBufReadExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let (runtime, workers) = match (
        runtime::main_runtime(),
        runtime::worker_runtime(config.rtp.worker_threads),
    ) {
        (Ok(rt), Ok(workers)) => (rt, workers),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(run(config, workers.handle().clone()));
    // A pending stdin read never finishes on its own.
    workers.shutdown_background();
    runtime.shutdown_background();
    info!("Server shut down.");
}

async fn run(config: ServerConfig, workers: Handle) {
    info!(
        "RTP Server v{} starting: {}",
        env!("CARGO_PKG_VERSION"),
        config.server.name
    );
    info!("Max players: {}", config.server.max_players);
    info!(
        "World: {} (generator: {}, seed: {})",
        config.world.name, config.world.generator, config.world.seed
    );
    info!(
        "Random teleport: radius {}, cooldown {}s, {} attempts, {} workers, level {}",
        config.rtp.max_radius,
        config.rtp.cooldown_secs,
        config.rtp.max_attempts,
        config.rtp.worker_threads,
        config.rtp.permission_level
    );

    let generator = match (config.world.generator_kind(), config.world.flat_blocks()) {
        (Ok(kind), Ok(layers)) => kind.build(config.world.seed as u64, &layers),
        (Err(e), _) | (_, Err(e)) => {
            error!("Invalid world configuration: {e}");
            return;
        }
    };
    let world = Arc::new(World::new(generator));

    let (outbox_tx, mut outbox_rx) = tokio::sync::mpsc::unbounded_channel();
    let host = Arc::new(ServerHost::new(world, outbox_tx));

    let ledger = Arc::new(CooldownLedger::new(config.rtp.cooldown()));
    let handler = RtpHandler::new(
        Arc::clone(&host),
        ledger,
        config.rtp.settings(),
        workers,
    );

    let mut registry = CommandRegistry::new();
    registry.register_stub(
        "rtp",
        "Teleport to a random safe location",
        config.rtp.permission_level,
    );
    let permissions = PermissionManager::load(config.permissions.default_level);
    let mut console = Console::new(Arc::clone(&host), handler, registry, permissions);

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    info!("Ready. Type \"help\" for a list of commands.");
    loop {
        tokio::select! {
            Some(line) = console_rx.recv() => {
                let outcome = console.handle_line(&line);
                for message in &outcome.messages {
                    info!("{message}");
                }
                if let Some(job) = outcome.pending {
                    tokio::spawn(log_report(job));
                }
                if outcome.should_stop {
                    break;
                }
            }
            Some(msg) = outbox_rx.recv() => {
                info!("[-> {}] {}", msg.name, msg.text);
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!(
        "Stopping with {} players online, {} chunks loaded",
        host.player_names().len(),
        host.world().loaded_chunks()
    );
}

async fn log_report(job: JoinHandle<RtpReport>) {
    match job.await {
        Ok(report) => info!(
            "Teleport report for player {}: {} after {} attempts (safe: {}, water: {:?}) in {:?}, {}",
            report.player,
            report.search.position,
            report.search.attempts,
            report.search.safe,
            report.search.water,
            report.elapsed,
            match &report.relocation {
                Ok(()) => "relocated".to_string(),
                Err(e) => e.to_string(),
            }
        ),
        Err(e) => warn!("Teleport job did not complete: {e}"),
    }
}
