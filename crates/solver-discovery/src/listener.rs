// solver-discovery/src/listener.rs

//! Websocket client for the upstream intent source.
//!
//! A single background task owns the socket. Inbound quote requests are
//! validated and forwarded as [`ListenerEvent`]s on a bounded channel; quote
//! responses travel back through a per-connection outbound queue so that
//! [`IntentListener::submit_quote`] never waits on the network.
//!
//! Delivery is at-most-once: responses queued on a connection that drops are
//! discarded, and a request id is answered at most once.

use crate::{config::ListenerConfig, error::ListenerError};
use backoff::{backoff::Backoff, ExponentialBackoff};
use dashmap::{mapref::entry::Entry, DashMap};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use solver_types::{
	now_ms, parse_inbound, Envelope, InboundMessage, ListenerEvent, MonotonicClock, Quote,
	TimestampMs,
};
use std::{
	fmt,
	sync::{
		atomic::{AtomicBool, AtomicU64, Ordering},
		Arc, Mutex, MutexGuard,
	},
};
use tokio::{
	net::TcpStream,
	sync::{
		mpsc::{self, error::TrySendError},
		watch,
	},
	task::JoinHandle,
	time::{interval_at, sleep, timeout, Instant, MissedTickBehavior},
};
use tokio_tungstenite::{
	connect_async,
	tungstenite::{self, protocol::Message},
	MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
	Idle,
	Connecting,
	Connected,
	Reconnecting,
	Failed,
	Stopped,
}

impl fmt::Display for ConnectionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Idle => write!(f, "Idle"),
			Self::Connecting => write!(f, "Connecting"),
			Self::Connected => write!(f, "Connected"),
			Self::Reconnecting => write!(f, "Reconnecting"),
			Self::Failed => write!(f, "Failed"),
			Self::Stopped => write!(f, "Stopped"),
		}
	}
}

/// Snapshot of listener counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerStatus {
	pub state: ConnectionState,
	pub messages_received: u64,
	pub messages_rejected: u64,
	pub quote_requests: u64,
	/// Quote responses written to the socket.
	pub quotes_generated: u64,
	pub events_dropped: u64,
	pub reconnects: u64,
	pub in_flight: usize,
}

#[derive(Debug, Default)]
struct Counters {
	messages_received: AtomicU64,
	messages_rejected: AtomicU64,
	quote_requests: AtomicU64,
	quotes_generated: AtomicU64,
	events_dropped: AtomicU64,
	reconnects: AtomicU64,
}

#[derive(Debug)]
struct Outbound {
	request_id: String,
	payload: String,
}

enum ConnectionEnd {
	Shutdown,
	Dropped(String),
}

#[derive(Debug)]
struct Shared {
	config: ListenerConfig,
	state: watch::Sender<ConnectionState>,
	fatal: Mutex<Option<ListenerError>>,
	/// Outbound queue of the live connection, if any.
	outbound: Mutex<Option<mpsc::Sender<Outbound>>>,
	/// Request ids awaiting a response, with their arrival time.
	in_flight: DashMap<String, TimestampMs>,
	events: mpsc::Sender<ListenerEvent>,
	counters: Counters,
	clock: MonotonicClock,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Errors after which reconnecting cannot succeed.
fn is_fatal(error: &tungstenite::Error) -> bool {
	matches!(
		error,
		tungstenite::Error::Http(_)
			| tungstenite::Error::HttpFormat(_)
			| tungstenite::Error::Url(_)
			| tungstenite::Error::Protocol(_)
	)
}

impl Shared {
	fn set_state(&self, state: ConnectionState) {
		let previous = self.state.send_replace(state);
		if previous != state {
			debug!("Listener state changed: {} -> {}", previous, state);
		}
	}

	fn fail(&self, error: ListenerError) {
		error!("Intent listener failed: {}", error);
		*lock(&self.fatal) = Some(error);
		self.set_state(ConnectionState::Failed);
	}

	/// Emits without waiting. Returns false if the event was not delivered.
	fn emit(&self, event: ListenerEvent) -> bool {
		match self.events.try_send(event) {
			Ok(()) => true,
			Err(TrySendError::Full(event)) => {
				self.counters.events_dropped.fetch_add(1, Ordering::Relaxed);
				warn!("Event buffer full, dropping {} event", event.name());
				false
			}
			Err(TrySendError::Closed(event)) => {
				debug!("No event consumer, dropping {} event", event.name());
				false
			}
		}
	}

	fn reject(&self, reason: String) {
		self.counters
			.messages_rejected
			.fetch_add(1, Ordering::Relaxed);
		self.emit(ListenerEvent::MessageRejected { reason });
	}

	fn handle_text(&self, text: &str) {
		self.counters
			.messages_received
			.fetch_add(1, Ordering::Relaxed);

		match parse_inbound(text) {
			Ok(InboundMessage::QuoteRequest {
				envelope_id,
				request,
				..
			}) => {
				let request_id = request.id.clone();
				match self.in_flight.entry(request_id.clone()) {
					Entry::Occupied(_) => {
						warn!("Dropping duplicate quote request {}", request_id);
						self.reject(format!("duplicate request {}", request_id));
						return;
					}
					Entry::Vacant(entry) => {
						entry.insert(now_ms());
					}
				}

				self.counters.quote_requests.fetch_add(1, Ordering::Relaxed);
				debug!(
					"Received quote request {} (envelope {})",
					request_id, envelope_id
				);

				if !self.emit(ListenerEvent::QuoteRequested(request)) {
					self.in_flight.remove(&request_id);
				}
			}
			Ok(InboundMessage::Heartbeat) => debug!("Heartbeat received"),
			Ok(InboundMessage::Ignored(kind)) => debug!("Ignoring {:?} message", kind),
			Err(e) => {
				warn!("Dropping malformed message: {}", e);
				self.reject(e.to_string());
			}
		}
	}

	async fn serve(&self, ws: WsStream, shutdown: &mut watch::Receiver<bool>) -> ConnectionEnd {
		let (mut sink, mut stream) = ws.split();
		let (out_tx, mut out_rx) = mpsc::channel::<Outbound>(self.config.outbound_buffer_size.max(1));
		*lock(&self.outbound) = Some(out_tx);

		let period = self.config.heartbeat_interval();
		let mut heartbeat = interval_at(Instant::now() + period, period);
		heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let mut last_seen = Instant::now();

		let end = loop {
			tokio::select! {
				_ = shutdown.changed() => {
					let _ = sink.send(Message::Close(None)).await;
					break ConnectionEnd::Shutdown;
				}
				frame = stream.next() => {
					let frame = match frame {
						Some(Ok(frame)) => frame,
						Some(Err(e)) => break ConnectionEnd::Dropped(e.to_string()),
						None => break ConnectionEnd::Dropped("stream ended".to_string()),
					};
					last_seen = Instant::now();

					match frame {
						Message::Text(text) => self.handle_text(&text),
						Message::Binary(data) => match String::from_utf8(data) {
							Ok(text) => self.handle_text(&text),
							Err(_) => self.reject("binary frame is not valid UTF-8".to_string()),
						},
						Message::Ping(payload) => {
							if let Err(e) = sink.send(Message::Pong(payload)).await {
								break ConnectionEnd::Dropped(e.to_string());
							}
						}
						Message::Close(frame) => {
							break ConnectionEnd::Dropped(format!("closed by server: {:?}", frame));
						}
						Message::Pong(_) | Message::Frame(_) => {}
					}
				}
				Some(outbound) = out_rx.recv() => {
					match sink.send(Message::Text(outbound.payload)).await {
						Ok(()) => {
							self.counters.quotes_generated.fetch_add(1, Ordering::Relaxed);
							debug!("Sent quote response for {}", outbound.request_id);
							self.emit(ListenerEvent::QuoteSubmitted {
								request_id: outbound.request_id,
							});
						}
						Err(e) => {
							warn!("Quote for {} lost: {}", outbound.request_id, e);
							break ConnectionEnd::Dropped(e.to_string());
						}
					}
				}
				_ = heartbeat.tick() => {
					if last_seen.elapsed() > self.config.heartbeat_timeout() {
						break ConnectionEnd::Dropped("heartbeat timeout".to_string());
					}
					if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
						break ConnectionEnd::Dropped(e.to_string());
					}
				}
			}
		};

		*lock(&self.outbound) = None;
		out_rx.close();
		let mut discarded = 0;
		while out_rx.try_recv().is_ok() {
			discarded += 1;
		}
		if discarded > 0 {
			warn!("Discarded {} undelivered quote responses", discarded);
		}

		end
	}
}

/// Connection loop: connect, serve, and reconnect with backoff until shut
/// down or out of attempts.
async fn run(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
	let config = &shared.config;
	let mut backoff = ExponentialBackoff {
		initial_interval: config.reconnect_initial_delay(),
		current_interval: config.reconnect_initial_delay(),
		max_interval: config.reconnect_max_delay(),
		max_elapsed_time: None,
		..Default::default()
	};
	let mut failures: u32 = 0;

	loop {
		if *shutdown.borrow() {
			return;
		}

		shared.set_state(ConnectionState::Connecting);
		info!("Connecting to intent source at {}", config.url);

		let attempt = tokio::select! {
			result = timeout(config.connect_timeout(), connect_async(config.url.as_str())) => result,
			_ = shutdown.changed() => return,
		};

		match attempt {
			Ok(Ok((ws, _))) => {
				failures = 0;
				backoff.reset();
				info!("Connected to intent source");
				shared.set_state(ConnectionState::Connected);
				shared.emit(ListenerEvent::Connected);

				match shared.serve(ws, &mut shutdown).await {
					ConnectionEnd::Shutdown => return,
					ConnectionEnd::Dropped(reason) => {
						warn!("Connection to intent source lost: {}", reason);
						shared.emit(ListenerEvent::Disconnected { reason });
					}
				}
			}
			Ok(Err(e)) if is_fatal(&e) => {
				shared.fail(ListenerError::Handshake(e.to_string()));
				return;
			}
			Ok(Err(e)) => {
				failures += 1;
				warn!("Connection attempt {} failed: {}", failures, e);
			}
			Err(_) => {
				failures += 1;
				warn!("Connection attempt {} timed out", failures);
			}
		}

		if failures > config.max_reconnects {
			shared.fail(ListenerError::ReconnectsExhausted(failures));
			return;
		}

		let delay = backoff
			.next_backoff()
			.unwrap_or_else(|| config.reconnect_max_delay());
		shared.counters.reconnects.fetch_add(1, Ordering::Relaxed);
		shared.set_state(ConnectionState::Reconnecting);
		shared.emit(ListenerEvent::Reconnecting {
			attempt: failures + 1,
			delay,
		});

		tokio::select! {
			_ = sleep(delay) => {}
			_ = shutdown.changed() => return,
		}
	}
}

/// Duplex connection to the intent source.
#[derive(Debug)]
pub struct IntentListener {
	shared: Arc<Shared>,
	shutdown: watch::Sender<bool>,
	task: Mutex<Option<JoinHandle<()>>>,
	stopped: AtomicBool,
}

impl IntentListener {
	/// Creates a listener and the receiver its events are delivered on.
	pub fn new(config: ListenerConfig) -> (Self, mpsc::Receiver<ListenerEvent>) {
		let (events_tx, events_rx) = mpsc::channel(config.event_buffer_size.max(1));
		let (state, _) = watch::channel(ConnectionState::Idle);
		let (shutdown, _) = watch::channel(false);

		let shared = Arc::new(Shared {
			config,
			state,
			fatal: Mutex::new(None),
			outbound: Mutex::new(None),
			in_flight: DashMap::new(),
			events: events_tx,
			counters: Counters::default(),
			clock: MonotonicClock::new(),
		});

		let listener = Self {
			shared,
			shutdown,
			task: Mutex::new(None),
			stopped: AtomicBool::new(false),
		};
		(listener, events_rx)
	}

	/// Starts the connection task and resolves once the connection is open.
	///
	/// Refused or reset connections are retried with backoff. Handshake
	/// failures and an exhausted retry budget are returned as errors.
	pub async fn initialize(&self) -> Result<(), ListenerError> {
		if self.stopped.load(Ordering::SeqCst) {
			return Err(ListenerError::Stopped);
		}

		let mut state_rx = self.shared.state.subscribe();
		{
			let mut task = lock(&self.task);
			if task.is_none() {
				info!("Starting intent listener for {}", self.shared.config.url);
				*task = Some(tokio::spawn(run(
					self.shared.clone(),
					self.shutdown.subscribe(),
				)));
			}
		}

		let state = *state_rx
			.wait_for(|state| {
				matches!(
					state,
					ConnectionState::Connected | ConnectionState::Failed | ConnectionState::Stopped
				)
			})
			.await
			.map_err(|_| ListenerError::Stopped)?;

		match state {
			ConnectionState::Connected => Ok(()),
			ConnectionState::Stopped => Err(ListenerError::Stopped),
			_ => Err(lock(&self.shared.fatal)
				.clone()
				.unwrap_or(ListenerError::NotConnected)),
		}
	}

	/// Queues a quote response for the request it answers.
	///
	/// Each request id is answered at most once. If there is no open
	/// connection the quote is dropped and the failure logged.
	pub fn submit_quote(&self, quote: Quote) -> Result<(), ListenerError> {
		let request_id = quote.request_id.clone();
		let result = self.enqueue(quote);
		if let Err(e) = &result {
			warn!("Quote for {} not sent: {}", request_id, e);
		}
		result
	}

	fn enqueue(&self, quote: Quote) -> Result<(), ListenerError> {
		let request_id = quote.request_id.clone();
		if self.shared.in_flight.remove(&request_id).is_none() {
			return Err(ListenerError::UnknownRequest(request_id));
		}

		let sender = lock(&self.shared.outbound)
			.clone()
			.ok_or(ListenerError::NotConnected)?;

		let envelope = Envelope::quote_response(quote, &self.shared.clock);
		let payload = serde_json::to_string(&envelope)
			.map_err(|e| ListenerError::Serialization(e.to_string()))?;

		sender
			.try_send(Outbound {
				request_id,
				payload,
			})
			.map_err(|e| match e {
				TrySendError::Full(_) => ListenerError::QueueFull,
				TrySendError::Closed(_) => ListenerError::NotConnected,
			})
	}

	/// Forgets an in-flight request that will not be answered.
	pub fn release(&self, request_id: &str) -> bool {
		self.shared.in_flight.remove(request_id).is_some()
	}

	/// Closes the connection and stops the background task. Idempotent.
	pub async fn stop(&self) {
		if self.stopped.swap(true, Ordering::SeqCst) {
			return;
		}

		info!("Stopping intent listener");
		self.shutdown.send_replace(true);

		let task = lock(&self.task).take();
		if let Some(task) = task {
			if let Err(e) = task.await {
				warn!("Listener task ended abnormally: {}", e);
			}
		}

		*lock(&self.shared.outbound) = None;
		self.shared.in_flight.clear();
		self.shared.set_state(ConnectionState::Stopped);
		self.shared.emit(ListenerEvent::Stopped);
	}

	pub fn state(&self) -> ConnectionState {
		*self.shared.state.borrow()
	}

	pub fn is_connected(&self) -> bool {
		self.state() == ConnectionState::Connected
	}

	/// Watch connection state changes.
	pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
		self.shared.state.subscribe()
	}

	pub fn get_status(&self) -> ListenerStatus {
		let c = &self.shared.counters;
		ListenerStatus {
			state: self.state(),
			messages_received: c.messages_received.load(Ordering::Relaxed),
			messages_rejected: c.messages_rejected.load(Ordering::Relaxed),
			quote_requests: c.quote_requests.load(Ordering::Relaxed),
			quotes_generated: c.quotes_generated.load(Ordering::Relaxed),
			events_dropped: c.events_dropped.load(Ordering::Relaxed),
			reconnects: c.reconnects.load(Ordering::Relaxed),
			in_flight: self.shared.in_flight.len(),
		}
	}
}
