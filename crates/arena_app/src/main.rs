//! # arena_app: session runner
//!
//! Runs an arena session headless. Each peer owns some fighters, drives their
//! state machines from scripted input, watches them for inactivity and
//! replicates every inactivity change to the other peers.
//!
//! ## Modes
//!
//! - `--local`: every peer of the session runs in this process, linked by an
//!   in-memory bus.
//! - default: this process is one peer (`--peer-index`) and talks to the
//!   others over NATS on `arena.session.<session>.inactivity`.

mod config;
mod presentation;
mod script;
mod tick;
mod world;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use arena_net::connection::{NatsConnection, resolve_url};
use arena_net::{MemoryBus, NatsTransport};
use config::GameConfig;
use tick::TickLoop;
use world::World;

#[derive(Debug, Parser)]
#[command(name = "arena_app", about = "Headless arena session with replicated inactivity")]
struct Args {
    /// JSON session file. Built-in demo session when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run every peer in this process over an in-memory bus.
    #[arg(long)]
    local: bool,

    /// Which peer's fighters this process owns (NATS mode).
    #[arg(long, default_value_t = 0)]
    peer_index: u32,

    /// Session name, used in the NATS subject.
    #[arg(short, long, default_value = "default")]
    session: String,

    /// NATS server URL.
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    /// Do not sleep between ticks (local mode).
    #[arg(long)]
    fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arena_app=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading session file {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.tick.max_ticks = ticks;
    }
    if args.fast {
        config.tick.realtime = false;
    }

    if args.local {
        run_local(config);
        Ok(())
    } else {
        run_nats(config, &args).await
    }
}

fn run_local(mut config: GameConfig) {
    if config.tick.max_ticks == 0 {
        // A local session has no Ctrl-C handling; cap it at twenty seconds.
        config.tick.max_ticks = u64::from(config.tick.tick_rate) * 20;
    }

    let bus = MemoryBus::new();
    let mut worlds: Vec<_> = (0..config.peer_count())
        .map(|peer| {
            let mut world = World::new(
                bus.join(Uuid::new_v4().to_string()),
                peer,
                config.timings.clone(),
                config.inactivity.clone(),
            );
            for spec in config.fighters_for(peer) {
                world.spawn(spec);
            }
            world
        })
        .collect();
    info!(peers = worlds.len(), "local session starting");

    let mut tick_loop = TickLoop::new(config.tick.clone());
    let notices = tick_loop.run(&mut worlds);

    for world in &worlds {
        for fighter in world.fighters() {
            let character = fighter.character();
            info!(
                peer = world.peer_id(),
                entity = %character.id(),
                name = character.display_name(),
                state = %fighter.state(),
                health = character.health().current(),
                x = character.position.x,
                inactive = fighter.is_inactive(),
                "final state"
            );
        }
    }
    info!(notices, "local session finished");
}

async fn run_nats(config: GameConfig, args: &Args) -> Result<()> {
    let url = resolve_url(args.nats_url.as_deref());
    let conn = NatsConnection::connect_to(&url).await?;

    let peer_id = Uuid::new_v4().to_string();
    let transport = NatsTransport::start(conn, &args.session, peer_id.clone()).await?;

    let mut world = World::new(
        transport,
        args.peer_index,
        config.timings.clone(),
        config.inactivity.clone(),
    );
    for spec in config.fighters_for(args.peer_index) {
        world.spawn(spec);
    }
    info!(
        session = args.session,
        peer = peer_id,
        peer_index = args.peer_index,
        fighters = world.fighters().len(),
        "joined session"
    );

    TickLoop::new(config.tick.clone())
        .run_async(&mut world)
        .await?;

    info!("arena session shut down");
    Ok(())
}
