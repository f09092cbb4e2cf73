use anyhow::Context;
use clap::Parser;
use iron_golem::config::Config;
use iron_golem::{ControlPlane, http};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Start and stop the Minecraft servers found in a directory over HTTP.
#[derive(Parser, Debug)]
#[command(name = "iron-golem", author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long)]
    address: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to directory with the minecraft servers
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// JSON or YAML settings file; command-line options take precedence
    #[arg(short, long, env = "IRON_GOLEM_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(address) = &self.address {
            config.http.address = address.clone();
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }
        if let Some(directory) = &self.directory {
            config.servers_dir = directory.clone();
        }

        Ok(config)
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(true)
        .init();

    let config = args.load_config()?;

    info!(servers_dir = %config.servers_dir.display(), "Starting iron-golem");
    let plane = Arc::new(
        ControlPlane::from_config(&config).context("building the server registry")?,
    );

    let served = http::serve(Arc::clone(&plane), &config.http).await;

    info!("Shutting down");
    if let Err(e) = plane.shutdown().await {
        warn!(error = %e, "Failed to stop every server cleanly");
    }

    served.context("serving the control API")?;
    Ok(())
}
