//! FlightSurety Oracle Server
//!
//! Registers a pool of simulated oracles against the FlightSurety contracts,
//! subscribes to contract events over the ledger's WebSocket endpoint, and
//! answers every flight status request with synthesized oracle submissions.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use flightsurety_oracle::{
    app_state::AppState,
    config::AppConfig,
    ledger::{subscription, JsonRpcLedger, LedgerClient},
    routes,
    services::{
        account_pool::AccountPool,
        diagnostic_sink::DiagnosticSink,
        event_listener::EventListener,
        oracle_registry::OracleRegistry,
        response_dispatcher::ResponseDispatcher,
        status_source::{RandomStatusSource, StatusSource},
    },
};

/// Events buffered between the subscription pump and the listener.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("bad environment configuration")?;

    let ledger: Arc<dyn LedgerClient> =
        Arc::new(JsonRpcLedger::new(config.rpc_url.clone(), config.app_address));

    let pool = AccountPool::load(ledger.as_ref())
        .await
        .context("cannot reach the ledger client")?;
    info!(identities = pool.len(), "loaded signer identities");

    // An incomplete oracle set must not start listening; any registration
    // failure aborts here.
    let registry = Arc::new(
        OracleRegistry::bootstrap(ledger.as_ref(), &pool, config.oracle_count)
            .await
            .context("oracle registration bootstrap failed")?,
    );

    let sink = Arc::new(DiagnosticSink::new());
    let status_source: Arc<dyn StatusSource> =
        Arc::new(RandomStatusSource::new(config.status_policy));
    let dispatcher = Arc::new(ResponseDispatcher::new(
        Arc::clone(&ledger),
        Arc::clone(&registry),
        status_source,
        config.response_policy,
        Arc::clone(&sink),
    ));

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let ws_url = config.ws_url.clone();
    let contracts = [config.app_address, config.data_address];
    let subscription =
        tokio::spawn(async move { subscription::pump_logs(&ws_url, &contracts, event_tx).await });

    tokio::spawn(EventListener::new(dispatcher, Arc::clone(&sink)).run(event_rx));

    // Create the app router
    let app = Router::new()
        .merge(routes::base_routes())
        .merge(routes::dapp_routes())
        .merge(routes::oracle_routes())
        .layer(build_cors_layer())
        .with_state(AppState::new(registry, sink));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    // The subscription has no internal reconnect; when it ends the process
    // exits and an external supervisor decides whether to restart it.
    tokio::select! {
        served = axum::serve(listener, app).into_future() => {
            served.context("API server terminated")?;
        }
        pumped = subscription => match pumped {
            Ok(Ok(())) => info!("ledger log stream closed; shutting down"),
            Ok(Err(error)) => {
                return Err(error).context("ledger log subscription failed");
            }
            Err(join_error) => {
                if join_error.is_panic() {
                    error!("log subscription task panicked");
                }
                return Err(join_error).context("log subscription task failed");
            }
        },
    }

    Ok(())
}

fn build_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
