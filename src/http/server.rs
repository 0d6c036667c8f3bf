//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the messaging handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, pipeline)
//! - Resolve identity and run the pipeline for every request
//! - Apply configuration reloads without losing rate-limit state
//! - Run background tasks (rate-limit sweeper) until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::chats::{chat_router, ChatState, ChatStore};
use crate::config::{GatewayConfig, RateLimitConfig};
use crate::http::request::request_context;
use crate::observability::metrics;
use crate::observability::request_log::{open_sink, LogSink, TracingSink};
use crate::pipeline::{Clock, Outcome, Pipeline, SystemClock};
use crate::security::authentication::{resolve_identity, Authenticator, StaticTokenAuthenticator};
use crate::security::rate_limit::{RateLimitStore, RateLimitSweeper};

/// Everything derived from one configuration snapshot.
pub struct GatewayInner {
    pub config: GatewayConfig,
    pub pipeline: Pipeline,
    pub authenticator: Box<dyn Authenticator>,
}

/// Shared state for the pipeline middleware.
///
/// `inner` and `rate_limit_settings` are swapped on reload; `rate_limits`
/// and `sink` live for the whole process.
#[derive(Clone)]
pub struct GatewayState {
    pub inner: Arc<ArcSwap<GatewayInner>>,
    pub clock: Arc<dyn Clock>,
    pub rate_limits: Arc<RateLimitStore>,
    pub rate_limit_settings: Arc<ArcSwap<RateLimitConfig>>,
    pub sink: Arc<dyn LogSink>,
}

impl GatewayInner {
    fn build(config: GatewayConfig, rate_limits: Arc<RateLimitStore>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            pipeline: Pipeline::from_config(&config, rate_limits, sink),
            authenticator: Box::new(StaticTokenAuthenticator::from_config(&config.auth)),
            config,
        }
    }
}

impl GatewayState {
    /// Replace the live pipeline. In-flight requests finish on the old one.
    pub fn reload(&self, config: GatewayConfig) {
        let current = self.inner.load();
        if current.config.request_log.path != config.request_log.path {
            tracing::warn!(
                path = %config.request_log.path,
                "request_log.path changes take effect on restart"
            );
        }
        self.rate_limit_settings
            .store(Arc::new(config.rate_limit.clone()));
        let inner = GatewayInner::build(config, self.rate_limits.clone(), self.sink.clone());
        tracing::info!(stages = ?inner.pipeline.stage_names(), "Pipeline reloaded");
        self.inner.store(Arc::new(inner));
    }

    /// Sweeper over the shared rate-limit table, tracking reloaded windows.
    pub fn rate_limit_sweeper(&self) -> RateLimitSweeper {
        RateLimitSweeper::new(
            self.rate_limits.clone(),
            self.clock.clone(),
            self.rate_limit_settings.clone(),
        )
    }
}

/// HTTP server for the chat gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    state: GatewayState,
}

impl GatewayServer {
    /// Create a server using the system clock and the configured log sink.
    pub fn new(config: GatewayConfig) -> Self {
        let sink: Arc<dyn LogSink> = if config.request_log.enabled {
            open_sink(&config.request_log.path)
        } else {
            Arc::new(TracingSink)
        };
        Self::with_parts(config, Arc::new(SystemClock), sink)
    }

    /// Create a server with an explicit clock and log sink.
    pub fn with_parts(config: GatewayConfig, clock: Arc<dyn Clock>, sink: Arc<dyn LogSink>) -> Self {
        let rate_limits = Arc::new(RateLimitStore::new());
        let inner = GatewayInner::build(config.clone(), rate_limits.clone(), sink.clone());
        let state = GatewayState {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
            clock,
            rate_limits,
            rate_limit_settings: Arc::new(ArcSwap::from_pointee(config.rate_limit.clone())),
            sink,
        };

        tracing::info!(
            stages = ?state.inner.load().pipeline.stage_names(),
            "Pipeline built"
        );

        let chats = ChatState {
            store: Arc::new(ChatStore::new()),
            config: Arc::new(config.chats.clone()),
        };
        let router = Self::build_router(&config, state.clone(), chats);

        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: GatewayState, chats: ChatState) -> Router {
        chat_router(chats)
            .layer(middleware::from_fn_with_state(state, pipeline_middleware))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, applying `config_updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.rate_limit.enabled {
            let sweeper = self.state.rate_limit_sweeper();
            tokio::spawn(sweeper.run(shutdown.resubscribe()));
        }

        let reload_state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(config) = config_updates.recv() => reload_state.reload(config),
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve identity, run the pipeline, then either dispatch or answer with the rejection.
async fn pipeline_middleware(
    State(state): State<GatewayState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let inner = state.inner.load_full();

    let identity = resolve_identity(inner.authenticator.as_ref(), request.headers());
    let ctx = request_context(&request, identity, state.clock.as_ref());

    let response = match inner.pipeline.run(&ctx) {
        Outcome::Dispatch => {
            request.extensions_mut().insert(ctx.identity);
            next.run(request).await
        }
        Outcome::ShortCircuit { stage, rejection } => {
            let status = rejection.status();
            tracing::debug!(stage, status = %status, client = %ctx.client, path = %ctx.path, "Request short-circuited");
            metrics::record_rejection(stage, status.as_u16());
            rejection.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
