//! MedLive Server - live transcript broadcast over secure WebSockets
//!
//! Runs one speech-to-text worker for the lifetime of the process and pushes
//! its partial/final transcripts to every connected client. Clients can
//! update the engine prompt while it runs.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use medlive_broadcaster::Broadcaster;
use medlive_engine::{CommandLauncher, EngineError, EngineLauncher, PromptCell, StdinLauncher, WorkerStatus};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use medlive_server::bridge::EventBridge;
use medlive_server::config::{EngineSource, ServerConfig};
use medlive_server::context::AppContext;
use medlive_server::filter::NoiseFilter;
use medlive_server::listener::TranscriptListener;
use medlive_server::{gpu, tls, version};

#[derive(Parser, Debug)]
#[command(name = "medlive-server", version, about = "Live transcript broadcast server")]
struct Cli {
    /// Configuration file (default: <config dir>/medlive/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port
    #[arg(long)]
    port: Option<u16>,

    /// Listen address
    #[arg(long)]
    bind: Option<String>,

    /// PEM certificate chain
    #[arg(long)]
    cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long)]
    key: Option<PathBuf>,

    /// Recognizer executable; implies the command engine source
    #[arg(long)]
    engine_command: Option<String>,

    /// Arguments passed to the recognizer executable
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Print build information and exit
    #[arg(long)]
    build_info: bool,
}

impl Cli {
    /// Override file settings with command-line flags
    fn apply(&self, config: &mut ServerConfig) -> Result<()> {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = &self.bind {
            config.bind_address = bind.clone();
        }
        if let Some(cert) = &self.cert {
            config.cert_path = cert.clone();
        }
        if let Some(key) = &self.key {
            config.key_path = key.clone();
        }
        if let Some(command) = &self.engine_command {
            config.engine.source = EngineSource::Command;
            config.engine.command = command.clone();
        }
        if !self.engine_args.is_empty() {
            if config.engine.source != EngineSource::Command {
                bail!("--engine-arg needs a recognizer command (--engine-command or engine.source = \"command\")");
            }
            config.engine.args = self.engine_args.clone();
        }
        Ok(())
    }
}

fn launcher_for(config: &ServerConfig) -> Box<dyn EngineLauncher> {
    match config.engine.source {
        EngineSource::Stdin => Box::new(StdinLauncher),
        EngineSource::Command => Box::new(CommandLauncher::new(
            config.engine.command.clone(),
            config.engine.args.clone(),
        )),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.build_info {
        print!("{}", version::version_long());
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    info!("🎙️ Starting MedLive server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load_from(path),
        None => ServerConfig::load(),
    }
    .context("Failed to load configuration")?;
    cli.apply(&mut config)?;
    config.validate().context("Invalid configuration")?;

    info!("📋 Configuration loaded from {}", config.config_path.display());

    // No certificates, no server
    let acceptor = tls::load_acceptor(&config.cert_path, &config.key_path)
        .context("Certificates missing or unreadable")?;
    info!("🔐 TLS identity loaded from {}", config.cert_path.display());

    // Select engine profile from hardware
    let (gpu_name, profile) = gpu::select_profile(&config.engine.model_override, &config.engine.language);
    match &gpu_name {
        Some(name) => info!("🎮 GPU detected: {}", name),
        None => warn!("⚠️ No GPU detected, using CPU (slower)"),
    }
    info!(
        "🧠 Profile: {} class, model {} ({}) on {}",
        profile.hardware.as_str(),
        profile.model,
        profile.compute_type,
        profile.device
    );

    let (broadcaster, broadcast_handle) = Broadcaster::new();
    let ctx = AppContext::new(&config, PromptCell::new(), WorkerStatus::new(), broadcast_handle.clone());

    // Engine worker thread
    let filter = NoiseFilter::new(&config.filter.suppressed_phrases, config.filter.min_final_chars);
    let bridge = EventBridge::new(
        launcher_for(&config),
        profile,
        ctx.prompt.clone(),
        ctx.worker.clone(),
        filter,
        broadcast_handle,
    );
    let (_worker, started) = bridge.spawn()?;

    let listener = TranscriptListener::bind(&config.listen_address(), acceptor, ctx)
        .await
        .context("Failed to start listener")?;
    tokio::spawn(broadcaster.run());

    info!("🚀 MedLive server ready (dynamic prompt enabled)");
    info!("📊 Memory usage: {} MB", get_memory_usage_mb());

    let start_failure = async move {
        match started.await {
            Ok(Err(e)) => e,
            // Started fine, or the worker thread died before reporting
            _ => std::future::pending::<EngineError>().await,
        }
    };

    tokio::select! {
        result = listener.run() => {
            if let Err(e) = result {
                error!("Listener error: {:#}", e);
            }
        }
        e = start_failure => {
            return Err(anyhow::Error::new(e).context("Engine failed to start"));
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Received shutdown signal");
        }
    }

    info!("👋 MedLive server stopped");
    Ok(())
}

/// Get current process memory usage in MB
fn get_memory_usage_mb() -> u64 {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let pid = Pid::from_u32(std::process::id());
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    sys.process(pid)
        .map(|process| process.memory() / 1_048_576)
        .unwrap_or(0)
}
