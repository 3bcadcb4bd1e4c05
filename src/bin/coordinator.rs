//! atlascoord Coordinator Binary
//!
//! Replays the decision journal into an applier and reports the topology.

use clap::Parser;
use atlascoord::applier::Transport;
use atlascoord::instance::{InstanceBindings, InstanceId, PendingConfig};
use atlascoord::journal::{FileDecisionLog, JournalRecovery};
use atlascoord::reconcile::LeastLoadedPolicy;
use atlascoord::{Applier, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// atlascoord Coordinator
#[derive(Parser, Debug)]
#[command(name = "atlascoord")]
#[command(about = "Topology and configuration coordinator for a partitioned key-value store")]
#[command(version)]
struct Args {
    /// Data directory (holds decisions.log)
    #[arg(short, long, default_value = "./atlascoord_data")]
    data_dir: String,

    /// Redelivery interval for unconfirmed configurations (ms)
    #[arg(short, long, default_value = "1000")]
    redelivery_ms: u64,

    /// Keep following the journal after replay
    #[arg(short, long)]
    follow: bool,
}

/// Transport that only logs; the network layer plugs in here
struct LogTransport;

impl Transport for LogTransport {
    fn deliver(
        &self,
        id: InstanceId,
        bindings: &InstanceBindings,
        config: &PendingConfig,
    ) -> atlascoord::Result<()> {
        tracing::debug!(
            "Would deliver config {} ({} bytes) to {} at {}",
            config.num,
            config.data.len(),
            id,
            bindings
        );
        Ok(())
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlascoord=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("atlascoord v{}", atlascoord::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .redelivery_interval_ms(args.redelivery_ms)
        .build();

    if let Err(e) = run(&config, args.follow) {
        tracing::error!("Coordinator error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config, follow: bool) -> atlascoord::Result<()> {
    let path = config.journal_path();
    if !path.exists() {
        tracing::warn!("No journal at {}; nothing to replay", path.display());
        return Ok(());
    }

    let recovery = JournalRecovery::verify(&path)?;
    tracing::info!(
        "Journal: {} decisions, last seq {}, {} trailing bytes",
        recovery.entries_recovered,
        recovery.last_seq,
        recovery.trailing_bytes
    );

    let mut applier = Applier::new(config, Box::new(LeastLoadedPolicy))?;
    let mut source = FileDecisionLog::open(&path)?;
    let transport = LogTransport;

    let consumed = applier.run_until_idle(&mut source, &transport)?;
    tracing::info!("Replayed {} decisions", consumed);
    report(&applier);

    if follow {
        applier.run(&mut source, &transport)?;
    }
    Ok(())
}

fn report(applier: &Applier) {
    let state = applier.state();
    tracing::info!(
        "Config version {}, {} instances ({} live)",
        state.config_version(),
        state.instances().len(),
        state.instances().live().count()
    );

    for space in state.spaces() {
        tracing::info!("Space '{}' key={}", space.name(), space.key());
        for (i, subspace) in space.subspaces().iter().enumerate() {
            let under = subspace
                .regions()
                .iter()
                .filter(|r| r.health().needs_replicas())
                .count();
            tracing::info!(
                "  subspace {}: {} regions, {} under-replicated",
                i,
                subspace.regions().len(),
                under
            );
        }
    }

    for instance in state.instances().iter() {
        tracing::info!(
            "{} {:?} at {}: {} pending, last acked {}, last rejected {}",
            instance.id(),
            instance.status(),
            instance.bindings(),
            instance.pending_len(),
            instance.last_acked(),
            instance.last_rejected()
        );
    }
}
