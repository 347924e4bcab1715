//! Solver service: wires the listener to the quote generator.

use crate::api::{self, AppState, ServiceStatus};
use anyhow::{Context, Result};
use solver_chains::AdapterTable;
use solver_config::SolverConfig;
use solver_core::QuoteGenerator;
use solver_discovery::IntentListener;
use solver_liquidity::Router;
use solver_pricing::Pricer;
use solver_types::{ListenerEvent, QuoteRequest};
use std::{
	sync::{Arc, Mutex},
	time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

/// Main solver service
pub struct SolverService {
	config: SolverConfig,
	generator: Arc<QuoteGenerator>,
	listener: Arc<IntentListener>,
	events: Mutex<Option<mpsc::Receiver<ListenerEvent>>>,
	dispatcher: Mutex<Option<JoinHandle<()>>>,
	api_server: Mutex<Option<JoinHandle<()>>>,
}

fn take<T>(slot: &Mutex<Option<T>>) -> Option<T> {
	slot.lock()
		.unwrap_or_else(|poisoned| poisoned.into_inner())
		.take()
}

fn put<T>(slot: &Mutex<Option<T>>, value: T) {
	*slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(value);
}

impl SolverService {
	pub fn new(config: SolverConfig) -> Result<Self> {
		let router = Router::new(config.routing.clone()).context("Invalid routing configuration")?;
		let pricer = Pricer::new(config.pricing.clone())
			.context("Invalid pricing configuration")?
			.with_quote_validity(config.quotes.quote_validity());
		let generator = Arc::new(QuoteGenerator::new(config.quotes.clone(), router, pricer));

		let (listener, events) = IntentListener::new(config.listener.clone());

		Ok(Self {
			config,
			generator,
			listener: Arc::new(listener),
			events: Mutex::new(Some(events)),
			dispatcher: Mutex::new(None),
			api_server: Mutex::new(None),
		})
	}

	/// Starts with the adapters described in the configuration.
	pub async fn start(&self) -> Result<()> {
		let adapters = AdapterTable::from_configs(&self.config.adapters)
			.context("Failed to build chain adapters")?;
		self.start_with_adapters(adapters).await
	}

	/// Installs `adapters`, connects to the intent source and starts serving.
	pub async fn start_with_adapters(&self, adapters: AdapterTable) -> Result<()> {
		let events = take(&self.events).context("Service already started")?;

		self.generator.initialize(adapters);

		put(
			&self.dispatcher,
			tokio::spawn(dispatch(
				events,
				self.generator.clone(),
				self.listener.clone(),
			)),
		);

		self.listener
			.initialize()
			.await
			.context("Failed to connect to intent source")?;

		let port = self.config.solver.http_port;
		if port != 0 {
			let state = self.app_state();
			put(
				&self.api_server,
				tokio::spawn(async move {
					if let Err(e) = api::serve(state, port).await {
						warn!("Status server stopped: {:#}", e);
					}
				}),
			);
		}

		info!("Solver service {} started", self.config.solver.name);
		Ok(())
	}

	/// Stops the listener, the dispatcher and the status server.
	pub async fn stop(&self) {
		info!("Stopping solver service");
		self.listener.stop().await;

		if let Some(mut dispatcher) = take(&self.dispatcher) {
			// The dispatcher exits on the listener's Stopped event.
			if tokio::time::timeout(Duration::from_secs(1), &mut dispatcher)
				.await
				.is_err()
			{
				dispatcher.abort();
			}
		}

		if let Some(server) = take(&self.api_server) {
			server.abort();
		}

		info!("Solver service stopped");
	}

	pub fn app_state(&self) -> AppState {
		AppState {
			name: self.config.solver.name.clone(),
			generator: self.generator.clone(),
			listener: self.listener.clone(),
		}
	}

	pub fn status(&self) -> ServiceStatus {
		self.app_state().status()
	}

	pub fn generator(&self) -> &Arc<QuoteGenerator> {
		&self.generator
	}

	pub fn listener(&self) -> &Arc<IntentListener> {
		&self.listener
	}
}

/// Routes listener events. Each quote request gets its own task so a slow
/// route never holds up the next request; the generator bounds how many
/// computations run at once.
async fn dispatch(
	mut events: mpsc::Receiver<ListenerEvent>,
	generator: Arc<QuoteGenerator>,
	listener: Arc<IntentListener>,
) {
	while let Some(event) = events.recv().await {
		match event {
			ListenerEvent::QuoteRequested(request) => {
				tokio::spawn(handle_request(request, generator.clone(), listener.clone()));
			}
			ListenerEvent::Connected => info!("Connected to intent source"),
			ListenerEvent::Disconnected { reason } => {
				warn!("Disconnected from intent source: {}", reason)
			}
			ListenerEvent::Reconnecting { attempt, delay } => {
				info!("Reconnecting to intent source (attempt {}) in {:?}", attempt, delay)
			}
			ListenerEvent::QuoteSubmitted { request_id } => {
				debug!("Quote for {} delivered", request_id)
			}
			ListenerEvent::MessageRejected { reason } => debug!("Message rejected: {}", reason),
			ListenerEvent::Stopped => {
				info!("Listener stopped, dispatcher exiting");
				break;
			}
		}
	}
}

async fn handle_request(
	request: QuoteRequest,
	generator: Arc<QuoteGenerator>,
	listener: Arc<IntentListener>,
) {
	match generator.generate_quote(&request).await {
		// Delivery failures are logged by the listener.
		Ok(quote) => {
			let _ = listener.submit_quote(quote);
		}
		Err(_) => {
			listener.release(&request.id);
		}
	}
}
