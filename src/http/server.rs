//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router for the configured profile
//! - Wire up middleware (request ID, tracing, in-flight tracking, metrics)
//! - Serve a bound listener until the shutdown signal fires, then drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::health::SentinelProbe;
use crate::http::handlers;
use crate::http::request::{
    propagate_request_id_layer, record_request_id_origin, set_request_id_layer, RequestIdExt,
};
use crate::lifecycle::ShutdownSignal;
use crate::net::InFlightTracker;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub readiness: SentinelProbe,
    pub liveness: SentinelProbe,
    pub instance_header: HeaderValue,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let instance_header = HeaderValue::from_str(&config.hostname).unwrap_or_else(|_| {
            tracing::warn!(hostname = %config.hostname, "Hostname is not a valid header value");
            HeaderValue::from_static("unknown")
        });

        Self {
            readiness: SentinelProbe::new("readyz", config.not_ready_file.clone()),
            liveness: SentinelProbe::new("livez", config.not_alive_file.clone()),
            instance_header,
            config,
        }
    }
}

/// Error returned when the serve loop fails.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("HTTP server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the probe endpoints.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    in_flight: InFlightTracker,
}

impl HttpServer {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let in_flight = InFlightTracker::new();
        let router = Self::build_router(Arc::clone(&config), in_flight.clone());
        Self {
            router,
            config,
            in_flight,
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: Arc<ServerConfig>, in_flight: InFlightTracker) -> Router {
        let profile = config.profile;
        let state = AppState::new(config);

        let mut router = Router::new()
            .route("/", any(handlers::root))
            .route("/readyz", any(handlers::readyz))
            .route("/livez", any(handlers::livez))
            .route("/sleep", any(handlers::sleep))
            .route("/ip", any(handlers::ip));

        if profile.serves_request_dump() {
            router = router.route("/request", any(handlers::request_dump));
        }

        router = if profile.root_is_catch_all() {
            router.fallback(handlers::root)
        } else {
            router.fallback(handlers::not_found)
        };

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(record_request_id_origin))
                .layer(set_request_id_layer())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request| {
                            tracing::info_span!(
                                "request",
                                request_id = %request.request_id(),
                                method = %request.method(),
                                uri = %request.uri(),
                            )
                        })
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(propagate_request_id_layer())
                .layer(middleware::from_fn_with_state(in_flight, track_in_flight)),
        )
    }

    /// Tracker shared with the lifecycle controller.
    pub fn in_flight(&self) -> InFlightTracker {
        self.in_flight.clone()
    }

    /// Serve until `shutdown` fires, then stop accepting and wait for open
    /// connections to finish. There is no drain deadline.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            profile = %self.config.profile,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn route_label(matched: Option<&str>) -> &'static str {
    match matched {
        Some("/") => "root",
        Some("/readyz") => "readyz",
        Some("/livez") => "livez",
        Some("/sleep") => "sleep",
        Some("/ip") => "ip",
        Some("/request") => "request",
        _ => "fallback",
    }
}

/// Holds an in-flight guard for the duration of the handler and records
/// per-route metrics.
async fn track_in_flight(
    State(in_flight): State<InFlightTracker>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let route = route_label(
        request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
    );

    let guard = in_flight.track();
    metrics::set_in_flight(in_flight.active_count());

    let response = next.run(request).await;

    drop(guard);
    metrics::set_in_flight(in_flight.active_count());
    metrics::record_request(route, response.status().as_u16(), start_time);

    response
}
