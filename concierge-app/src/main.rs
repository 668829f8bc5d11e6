use anyhow::Result;
use clap::Parser;
use concierge_app::Tether;
use concierge_common::observability::{LogConfig, init_logging};
use concierge_config::{ConciergeConfig, ConciergeConfigLoader};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "concierge", about = "AI travel concierge API")]
struct Args {
    /// YAML config file; without it `concierge.yaml` is looked up in the
    /// user config dir and the working directory.
    #[arg(long, env = "CONCIERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override `server.listen`.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // File layers first, CONCIERGE__* env on top.
    let loader = ConciergeConfigLoader::new();
    let loader = match &args.config {
        Some(path) => loader.with_file(path),
        None => loader.with_default_locations(),
    };
    let mut cfg: ConciergeConfig = loader.load()?;
    if let Some(listen) = args.listen {
        cfg.server.listen = listen;
    }

    // Logging needs the config, so nothing above this line is traced.
    let log_path = init_logging(LogConfig {
        app_name: "concierge".to_string(),
        log_dir: cfg.logging.directory.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::info!(log_file = %log_path.display(), model = %cfg.llm.model, "startup.config.loaded");

    let tether = Tether::from_config(&cfg)?;
    tether.probe().await;
    tether.run().await
}
