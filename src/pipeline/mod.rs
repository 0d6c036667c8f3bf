//! Request interception pipeline.
//!
//! # Data Flow
//! ```text
//! RECEIVED
//!     → RequestLogger   (LOGGED)
//!     → TimeWindowGate  (TIME_CHECKED)   ─┐
//!     → RateLimiter     (RATE_CHECKED)   ─┼─→ SHORT_CIRCUITED (Rejection → response)
//!     → RoleGate        (ROLE_CHECKED)   ─┘
//!     → DISPATCHED      (handler runs)
//! ```
//!
//! # Design Decisions
//! - Stages are synchronous; the only awaited work is the handler itself
//! - Each stage decides whether to call `next`; not calling it short-circuits
//! - Order is fixed when the pipeline is built and never changes per request

pub mod clock;
pub mod context;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use crate::config::GatewayConfig;
use crate::observability::request_log::{LogSink, RequestLogger};
use crate::security::rate_limit::{RateLimitStore, RateLimiter};
use crate::security::role_gate::RoleGate;
use crate::security::time_window::TimeWindowGate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{resolve_client, ClientKey, RequestContext};

/// A policy decision that ends the pipeline early.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("{message}")]
    OutsideWindow { message: String },
    #[error("{message}")]
    RateLimited { message: String, retry_after: Duration },
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,
    #[error("You do not have permission to perform this action.")]
    Forbidden,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::OutsideWindow { .. } | Rejection::Forbidden => StatusCode::FORBIDDEN,
            Rejection::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Rejection::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Result of running the pipeline over one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every stage passed; the handler should run.
    Dispatch,
    /// `stage` stopped the request.
    ShortCircuit {
        stage: &'static str,
        rejection: Rejection,
    },
}

impl Outcome {
    pub fn reject(stage: &'static str, rejection: Rejection) -> Self {
        Outcome::ShortCircuit { stage, rejection }
    }

    pub fn is_dispatch(&self) -> bool {
        matches!(self, Outcome::Dispatch)
    }
}

/// One interceptor in the chain.
pub trait Stage: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Inspect the request and either return a rejection or defer to `next`.
    fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Outcome;
}

/// The remainder of the chain after the current stage.
pub struct Next<'a> {
    stages: &'a [Box<dyn Stage>],
}

impl Next<'_> {
    pub fn run(self, ctx: &RequestContext) -> Outcome {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.process(ctx, Next { stages: rest }),
            None => Outcome::Dispatch,
        }
    }
}

/// An ordered, immutable chain of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Standard four-stage chain. Disabled stages are left out.
    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<RateLimitStore>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let mut builder = Pipeline::builder();
        if config.request_log.enabled {
            builder = builder.stage(RequestLogger::new(sink));
        }
        if config.time_window.enabled {
            builder = builder.stage(TimeWindowGate::from_config(&config.time_window));
        }
        if config.rate_limit.enabled {
            builder = builder.stage(RateLimiter::from_config(&config.rate_limit, store));
        }
        if config.role_gate.enabled {
            builder = builder.stage(RoleGate::from_config(&config.role_gate));
        }
        builder.build()
    }

    pub fn run(&self, ctx: &RequestContext) -> Outcome {
        Next {
            stages: &self.stages,
        }
        .run(ctx)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// Append a stage; stages run in insertion order.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
