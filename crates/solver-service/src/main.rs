use anyhow::{Context, Result};
use clap::Parser;
use solver_config::{ConfigLoader, SolverConfig};
use solver_monitoring::init_tracing;
use solver_service::{
	cli::{Args, Command},
	SolverService,
};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let mut config = ConfigLoader::new()
		.with_file(&args.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", args.config))?;

	if let Some(level) = &args.log_level {
		config.solver.log_level = level.clone();
	}
	init_tracing(config.tracing_config()).context("Failed to initialize tracing")?;

	match args.command() {
		Command::Start => start_service(config).await,
		Command::Validate => validate_config(&args, &config),
	}
}

async fn start_service(config: SolverConfig) -> Result<()> {
	info!("Starting OIF Solver Service");
	info!("Solver name: {}", config.solver.name);
	info!("Intent source: {}", config.listener.url);
	info!("Adapters configured for {:?}", config.adapter_chains());

	let service = SolverService::new(config).context("Failed to build solver service")?;
	if let Err(e) = service.start().await {
		service.stop().await;
		return Err(e.context("Failed to start solver service"));
	}

	info!("OIF Solver Service started successfully");

	shutdown_signal().await;

	info!("Shutdown signal received, stopping services...");
	service.stop().await;

	info!("OIF Solver Service stopped");
	Ok(())
}

fn validate_config(args: &Args, config: &SolverConfig) -> Result<()> {
	info!("Configuration {:?} is valid", args.config);
	info!("Solver name: {}", config.solver.name);
	info!("Intent source: {}", config.listener.url);
	info!("Hub chains: {:?}", config.routing.hub_chains);
	for chain in config.adapter_chains() {
		if let Some(adapter) = config.adapters.get(&chain) {
			info!("  Adapter for {}: {}", chain, adapter.kind());
		}
	}
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			warn!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				warn!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
