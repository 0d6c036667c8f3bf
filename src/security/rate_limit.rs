//! Sliding-window rate limiting for message writes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::pipeline::{ClientKey, Clock, Next, Outcome, Rejection, RequestContext, Stage};
use crate::routing::{AndMatcher, AnyMatcher, Matcher, MethodMatcher};

/// Per-client request timestamps, oldest first.
///
/// The entry guard is held across purge, check and append, so concurrent
/// requests from the same client cannot both take the last slot.
#[derive(Debug, Default)]
pub struct RateLimitStore {
    windows: DashMap<ClientKey, VecDeque<Instant>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request at `now` if the client has room.
    ///
    /// Returns `Err(retry_after)` when `limit` requests already fall within `window`.
    pub fn check(
        &self,
        key: ClientKey,
        now: Instant,
        limit: usize,
        window: Duration,
    ) -> Result<(), Duration> {
        let mut entry = self.windows.entry(key).or_default();
        let timestamps = entry.value_mut();

        purge(timestamps, now, window);

        if timestamps.len() >= limit {
            let oldest = timestamps.front().copied().unwrap_or(now);
            let retry_after = window.saturating_sub(now.saturating_duration_since(oldest));
            return Err(retry_after);
        }

        timestamps.push_back(now);
        Ok(())
    }

    /// Drop clients with nothing left in the window. Returns how many were removed.
    pub fn sweep(&self, now: Instant, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            purge(timestamps, now, window);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Requests recorded for `key` within the window ending at `now`.
    pub fn recent(&self, key: &ClientKey, now: Instant, window: Duration) -> usize {
        self.windows
            .get(key)
            .map(|ts| {
                ts.iter()
                    .filter(|t| now.saturating_duration_since(**t) < window)
                    .count()
            })
            .unwrap_or(0)
    }
}

fn purge(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.saturating_duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

/// Third pipeline stage: caps write requests per client IP.
pub struct RateLimiter {
    store: Arc<RateLimitStore>,
    scope: AndMatcher,
    max_requests: usize,
    window: Duration,
    message: String,
}

impl RateLimiter {
    pub fn from_config(config: &RateLimitConfig, store: Arc<RateLimitStore>) -> Self {
        let window = Duration::from_secs(config.window_secs);
        Self {
            store,
            scope: AndMatcher::new(vec![
                Box::new(MethodMatcher::from_names(&config.methods)),
                Box::new(AnyMatcher::patterns(&config.paths)),
            ]),
            max_requests: config.max_requests,
            window,
            message: format!(
                "Rate limit exceeded. Maximum {} messages per {} seconds.",
                config.max_requests, config.window_secs
            ),
        }
    }
}

impl Stage for RateLimiter {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Outcome {
        if !self.scope.matches(ctx) {
            return next.run(ctx);
        }

        match self
            .store
            .check(ctx.client, ctx.received_at, self.max_requests, self.window)
        {
            Ok(()) => next.run(ctx),
            Err(retry_after) => {
                tracing::warn!(client = %ctx.client, path = %ctx.path, "Rate limit exceeded");
                Outcome::reject(
                    self.name(),
                    Rejection::RateLimited {
                        message: self.message.clone(),
                        retry_after,
                    },
                )
            }
        }
    }
}

/// Periodically drops idle clients so abandoned IPs do not accumulate.
///
/// The window is read from `settings` on every pass, so a reload that
/// lengthens it never purges timestamps the limiter still counts. The
/// interval is fixed when the sweeper starts.
pub struct RateLimitSweeper {
    store: Arc<RateLimitStore>,
    clock: Arc<dyn Clock>,
    settings: Arc<ArcSwap<RateLimitConfig>>,
    interval: Duration,
}

impl RateLimitSweeper {
    pub fn new(
        store: Arc<RateLimitStore>,
        clock: Arc<dyn Clock>,
        settings: Arc<ArcSwap<RateLimitConfig>>,
    ) -> Self {
        let interval = Duration::from_secs(settings.load().sweep_interval_secs);
        Self {
            store,
            clock,
            settings,
            interval,
        }
    }

    /// One pass with the window currently in force. Returns how many clients were dropped.
    pub fn sweep(&self) -> usize {
        let window = Duration::from_secs(self.settings.load().window_secs);
        let removed = self.store.sweep(self.clock.now(), window);
        let remaining = self.store.tracked_clients();
        metrics::record_tracked_clients(remaining);
        if removed > 0 {
            tracing::debug!(removed, remaining, "Swept idle rate limit entries");
        }
        removed
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Rate limit sweeper disabled");
            return;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Rate limit sweeper starting");
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
