//! Entry point for the TintHealth simulation host.

use anyhow::Context;
use std::time::Duration;
use tint_server::{logging::setup_logging, AppConfig, CliArgs, TintServer};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;

    let result = runtime.block_on(run(args));

    // The stdin reader sits on a blocking thread that never returns on its own.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .with_context(|| format!("Failed to load {}", args.config_path.display()))?;
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        anyhow::bail!("Configuration validation failed: {}", e);
    }

    setup_logging(&config.logging)?;
    display_banner(&config);

    TintServer::new(config).run().await
}

fn display_banner(config: &AppConfig) {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║         🟥 TINTHEALTH SERVER v{:<8}   ║", version);
    info!("╚══════════════════════════════════════════╝");
    info!(
        "📂 Data: {} | World: {} | Demo players: {}",
        config.server.data_dir, config.server.default_world, config.simulation.demo_players
    );
}
