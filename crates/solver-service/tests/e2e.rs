//! End-to-end tests: a mock intent source drives the full service over a
//! real websocket.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use solver_chains::{
	implementations::{BridgeLaneConfig, PoolAdapterConfig, PoolConfig},
	AdapterTable, ChainAdapter, PoolAdapter,
};
use solver_config::SolverConfig;
use solver_service::SolverService;
use solver_types::{AdapterError, AdapterResult, ChainId, LiquiditySource, TokenRef, U256};
use std::{
	collections::HashSet,
	str::FromStr,
	sync::Arc,
	time::{Duration, Instant},
};
use tokio::{net::TcpListener, sync::mpsc, time::timeout};
use tokio_tungstenite::{accept_async, tungstenite::Message};

const ETH: &str = "0xeeee";
const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
const ONE_ETH: u128 = 1_000_000_000_000_000_000;

/// Websocket server standing in for the intent source.
struct MockIntentSource {
	url: String,
	to_solver: mpsc::UnboundedSender<String>,
	from_solver: mpsc::UnboundedReceiver<String>,
}

impl MockIntentSource {
	async fn start() -> Self {
		let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = server.local_addr().unwrap();
		let (to_solver, mut outbound) = mpsc::unbounded_channel::<String>();
		let (inbound, from_solver) = mpsc::unbounded_channel::<String>();

		tokio::spawn(async move {
			let (stream, _) = server.accept().await.unwrap();
			let mut ws = accept_async(stream).await.unwrap();
			loop {
				tokio::select! {
					Some(text) = outbound.recv() => {
						if ws.send(Message::Text(text)).await.is_err() {
							break;
						}
					}
					msg = ws.next() => match msg {
						Some(Ok(Message::Text(text))) => {
							let _ = inbound.send(text);
						}
						Some(Ok(_)) => {}
						_ => break,
					},
				}
			}
		});

		Self {
			url: format!("ws://{}", addr),
			to_solver,
			from_solver,
		}
	}

	fn request(&self, data: Value) {
		let id = data["id"].as_str().unwrap_or_default().to_string();
		let frame = json!({
			"type": "quote_request",
			"id": format!("env-{}", id),
			"timestamp": 1_700_000_000_000u64,
			"data": data,
		});
		self.to_solver.send(frame.to_string()).unwrap();
	}

	async fn next_response(&mut self) -> Value {
		let text = timeout(Duration::from_secs(5), self.from_solver.recv())
			.await
			.expect("timed out waiting for a quote response")
			.expect("mock server closed");
		let value: Value = serde_json::from_str(&text).unwrap();
		assert_eq!(value["type"], "quote_response");
		value
	}

	async fn responses(&mut self, count: usize) -> Vec<Value> {
		let mut responses = Vec::with_capacity(count);
		for _ in 0..count {
			responses.push(self.next_response().await);
		}
		responses
	}
}

fn token(chain: &str, address: &str, symbol: &str, decimals: u8) -> Value {
	json!({"address": address, "symbol": symbol, "decimals": decimals, "chainId": chain})
}

fn eth_to_usdc(id: &str, amount: u128, urgency: &str) -> Value {
	json!({
		"id": id,
		"sourceChain": "ethereum",
		"destinationChain": "ethereum",
		"sourceToken": token("ethereum", ETH, "ETH", 18),
		"destinationToken": token("ethereum", USDC, "USDC", 6),
		"sourceAmount": amount.to_string(),
		"metadata": {"urgency": urgency},
	})
}

fn eth_to_near(id: &str, amount: u128) -> Value {
	json!({
		"id": id,
		"sourceChain": "ethereum",
		"destinationChain": "near",
		"sourceToken": token("ethereum", ETH, "ETH", 18),
		"destinationToken": token("near", "wrap.near", "wNEAR", 24),
		"sourceAmount": amount.to_string(),
	})
}

fn from_chain(id: &str, chain: &str, address: &str, decimals: u8) -> Value {
	json!({
		"id": id,
		"sourceChain": chain,
		"destinationChain": "ethereum",
		"sourceToken": token(chain, address, "SRC", decimals),
		"destinationToken": token("ethereum", ETH, "ETH", 18),
		"sourceAmount": "1000000",
	})
}

fn amount(value: &Value) -> U256 {
	U256::from_str(value.as_str().unwrap()).unwrap()
}

#[derive(Debug)]
struct FailingAdapter(ChainId);

#[async_trait]
impl ChainAdapter for FailingAdapter {
	fn chain_id(&self) -> ChainId {
		self.0
	}

	fn name(&self) -> &str {
		"failing"
	}

	async fn get_liquidity_sources(
		&self,
		_source_token: &TokenRef,
		_destination_token: &TokenRef,
		_amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>> {
		Err(AdapterError::Unavailable("node down".into()))
	}
}

#[derive(Debug)]
struct HangingAdapter(ChainId);

#[async_trait]
impl ChainAdapter for HangingAdapter {
	fn chain_id(&self) -> ChainId {
		self.0
	}

	fn name(&self) -> &str {
		"hanging"
	}

	async fn get_liquidity_sources(
		&self,
		_source_token: &TokenRef,
		_destination_token: &TokenRef,
		_amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>> {
		std::future::pending().await
	}
}

fn ethereum_adapter() -> PoolAdapter {
	let config = PoolAdapterConfig {
		name: Some("eth-test".to_string()),
		pools: vec![PoolConfig {
			protocol: "uniswap-v3".to_string(),
			token_a: ETH.to_string(),
			token_b: USDC.to_string(),
			// 10k ETH against 30M USDC
			reserve_a: U256::from(10_000u64) * U256::from(ONE_ETH),
			reserve_b: U256::from(30_000_000_000_000u64),
			fee_bps: 30,
			confidence: 95,
		}],
		bridges: vec![BridgeLaneConfig {
			protocol: "rainbow-bridge".to_string(),
			source_token: USDC.to_string(),
			destination_chain: ChainId::Near,
			destination_token: "wrap.near".to_string(),
			rate: "0.25".parse().unwrap(),
			fee_bps: 10,
			confidence: 90,
			liquidity: U256::from(5_000_000_000_000u64),
		}],
		latency_ms: 0,
	};
	PoolAdapter::new(ChainId::Ethereum, config).unwrap()
}

fn adapters() -> AdapterTable {
	AdapterTable::new()
		.with_adapter(Arc::new(ethereum_adapter()))
		.unwrap()
		.with_adapter(Arc::new(FailingAdapter(ChainId::Cosmos)))
		.unwrap()
		.with_adapter(Arc::new(HangingAdapter(ChainId::Bitcoin)))
		.unwrap()
}

async fn start_service(source: &MockIntentSource) -> SolverService {
	start_service_with_slots(source, 64).await
}

async fn start_service_with_slots(source: &MockIntentSource, slots: usize) -> SolverService {
	let mut config = SolverConfig::default();
	config.solver.http_port = 0;
	config.listener.url = source.url.clone();
	config.quotes.quote_timeout_ms = 500;
	config.quotes.max_concurrent_quotes = slots;

	let service = SolverService::new(config).unwrap();
	service.start_with_adapters(adapters()).await.unwrap();
	service
}

#[tokio::test]
async fn test_every_request_gets_one_response() {
	let mut source = MockIntentSource::start().await;
	let service = start_service(&source).await;

	for i in 0..20 {
		source.request(eth_to_usdc(&format!("req-{}", i), ONE_ETH + i as u128, "medium"));
	}
	let responses = source.responses(20).await;

	let request_ids: HashSet<String> = responses
		.iter()
		.map(|r| r["data"]["requestId"].as_str().unwrap().to_string())
		.collect();
	let envelope_ids: HashSet<String> = responses
		.iter()
		.map(|r| r["id"].as_str().unwrap().to_string())
		.collect();
	let timestamps: HashSet<u64> = responses
		.iter()
		.map(|r| r["timestamp"].as_u64().unwrap())
		.collect();
	assert_eq!(request_ids.len(), 20);
	assert_eq!(envelope_ids.len(), 20);
	assert_eq!(timestamps.len(), 20);

	let status = service.status();
	assert_eq!(status.quotes.quotes_generated, 20);
	assert_eq!(status.listener.quote_requests, 20);
	assert_eq!(status.listener.in_flight, 0);

	service.stop().await;
}

#[tokio::test]
async fn test_same_chain_quote() {
	let mut source = MockIntentSource::start().await;
	let service = start_service(&source).await;

	source.request(eth_to_usdc("same-chain", ONE_ETH, "medium"));
	let quote = source.next_response().await["data"].clone();

	assert_eq!(quote["requestId"], "same-chain");
	assert_eq!(quote["route"].as_array().unwrap().len(), 1);
	assert_eq!(quote["route"][0]["kind"], "swap");
	assert!(quote["confidence"].as_u64().unwrap() > 80);

	// Roughly 3000 USDC for 1 ETH, less fees and impact.
	let out = amount(&quote["destinationAmount"]);
	assert!(out > U256::from(2_900_000_000u64));
	assert!(out < U256::from(3_000_000_000u64));
	assert!(quote["expiresAt"].as_u64().unwrap() > quote["generatedAt"].as_u64().unwrap());

	service.stop().await;
}

#[tokio::test]
async fn test_cross_chain_quote() {
	let mut source = MockIntentSource::start().await;
	let service = start_service(&source).await;

	source.request(eth_to_near("cross-chain", ONE_ETH));
	let quote = source.next_response().await["data"].clone();

	let route = quote["route"].as_array().unwrap();
	assert!(route.len() >= 2);
	assert_eq!(route[0]["chain"], "ethereum");
	assert_eq!(route.last().unwrap()["kind"], "bridge");
	assert_eq!(route.last().unwrap()["targetChain"], "near");
	assert_eq!(quote["confidence"], 90);
	assert!(!amount(&quote["destinationAmount"]).is_zero());
	assert!(!amount(&quote["safetyDeposit"]).is_zero());

	service.stop().await;
}

#[tokio::test]
async fn test_urgency_raises_fee() {
	let mut source = MockIntentSource::start().await;
	let service = start_service(&source).await;

	source.request(eth_to_usdc("low", ONE_ETH, "low"));
	source.request(eth_to_usdc("high", ONE_ETH, "high"));

	let mut fees = std::collections::HashMap::new();
	for response in source.responses(2).await {
		let data = &response["data"];
		fees.insert(
			data["requestId"].as_str().unwrap().to_string(),
			amount(&data["solverFee"]),
		);
	}
	assert!(fees["high"] > fees["low"]);

	service.stop().await;
}

#[tokio::test]
async fn test_failing_adapters_do_not_block_other_requests() {
	let mut source = MockIntentSource::start().await;
	let service = start_service(&source).await;

	source.request(from_chain("from-cosmos", "cosmos", "uatom", 6));
	source.request(from_chain("from-bitcoin", "bitcoin", "btc", 8));
	for i in 0..3 {
		source.request(eth_to_usdc(&format!("ok-{}", i), ONE_ETH, "medium"));
	}

	let answered: HashSet<String> = source
		.responses(3)
		.await
		.iter()
		.map(|r| r["data"]["requestId"].as_str().unwrap().to_string())
		.collect();
	assert_eq!(
		answered,
		["ok-0", "ok-1", "ok-2"]
			.into_iter()
			.map(String::from)
			.collect::<HashSet<_>>()
	);

	// The failed requests are released without a response.
	let mut in_flight = usize::MAX;
	for _ in 0..50 {
		in_flight = service.status().listener.in_flight;
		if in_flight == 0 {
			break;
		}
		tokio::time::sleep(Duration::from_millis(50)).await;
	}
	assert_eq!(in_flight, 0);
	assert!(timeout(Duration::from_millis(200), source.from_solver.recv())
		.await
		.is_err());

	let stats = service.status().quotes;
	assert_eq!(stats.quotes_generated, 3);
	assert_eq!(stats.quotes_failed, 1);
	assert_eq!(stats.quotes_timed_out, 1);

	service.stop().await;
}

#[tokio::test]
async fn test_invalid_request_is_not_answered() {
	let mut source = MockIntentSource::start().await;
	let service = start_service(&source).await;

	// Zero amount fails validation; the valid request after it still succeeds.
	source.request(eth_to_usdc("zero", 0, "medium"));
	source.request(eth_to_usdc("valid", ONE_ETH, "medium"));

	let response = source.next_response().await;
	assert_eq!(response["data"]["requestId"], "valid");

	tokio::time::sleep(Duration::from_millis(100)).await;
	let status = service.status();
	assert_eq!(status.quotes.validation_failures, 1);
	assert_eq!(status.listener.in_flight, 0);

	service.stop().await;
}

#[tokio::test]
async fn test_saturated_slots_do_not_extend_the_deadline() {
	let mut source = MockIntentSource::start().await;
	let service = start_service_with_slots(&source, 1).await;

	// Both hang on bitcoin; the first holds the only slot until its deadline.
	source.request(from_chain("stuck-1", "bitcoin", "btc", 8));
	source.request(from_chain("stuck-2", "bitcoin", "btc", 8));
	tokio::time::sleep(Duration::from_millis(250)).await;

	let sent = Instant::now();
	source.request(eth_to_usdc("healthy", ONE_ETH, "medium"));
	let response = source.next_response().await;

	assert_eq!(response["data"]["requestId"], "healthy");
	assert!(sent.elapsed() < Duration::from_millis(500));

	let stats = service.status().quotes;
	assert_eq!(stats.quotes_timed_out, 2);
	assert_eq!(stats.quotes_generated, 1);

	service.stop().await;
}
