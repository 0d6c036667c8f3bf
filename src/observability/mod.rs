//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! The pipeline additionally produces:
//!     → request_log.rs (one access line per request to an append-only sink)
//! ```
//!
//! # Design Decisions
//! - Operational logs and the access log are separate sinks
//! - Request ID flows through tower-http layers
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod request_log;
