//! Hour-of-day access gate.

use chrono::Timelike;

use crate::config::TimeWindowConfig;
use crate::pipeline::{Next, Outcome, Rejection, RequestContext, Stage};

/// Allows requests only while the local hour is inside `[start, end)`.
///
/// Evaluated at hour granularity: with the default `[18, 21)` window a request
/// at 20:59:59 passes and one at 21:00:00 does not. When `start > end` the
/// window wraps past midnight.
#[derive(Debug, Clone)]
pub struct TimeWindowGate {
    start_hour: u32,
    end_hour: u32,
    message: String,
}

impl TimeWindowGate {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
            message: format!(
                "Access to the messaging app is only allowed between {start_hour:02}:00 and {end_hour:02}:00."
            ),
        }
    }

    pub fn from_config(config: &TimeWindowConfig) -> Self {
        Self::new(config.start_hour, config.end_hour)
    }

    pub fn allows(&self, hour: u32) -> bool {
        if self.start_hour < self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            false
        }
    }
}

impl Stage for TimeWindowGate {
    fn name(&self) -> &'static str {
        "time_window"
    }

    fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Outcome {
        let hour = ctx.local_time.hour();
        if self.allows(hour) {
            return next.run(ctx);
        }

        tracing::info!(hour, path = %ctx.path, "Request outside access window");
        Outcome::reject(
            self.name(),
            Rejection::OutsideWindow {
                message: self.message.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::context;
    use crate::pipeline::Pipeline;
    use axum::http::Method;
    use chrono::{Local, TimeZone};

    fn at(hour: u32, minute: u32, second: u32) -> RequestContext {
        let mut ctx = context(Method::GET, "/api/conversations");
        ctx.local_time = Local
            .with_ymd_and_hms(2026, 1, 15, hour, minute, second)
            .unwrap();
        ctx
    }

    #[test]
    fn test_default_window_boundaries() {
        let gate = TimeWindowGate::from_config(&TimeWindowConfig::default());
        assert!(!gate.allows(17));
        assert!(gate.allows(18));
        assert!(gate.allows(19));
        assert!(gate.allows(20));
        assert!(!gate.allows(21));
        assert!(!gate.allows(0));
    }

    #[test]
    fn test_hour_granularity() {
        let pipeline = Pipeline::builder().stage(TimeWindowGate::new(18, 21)).build();

        assert!(pipeline.run(&at(20, 59, 59)).is_dispatch());
        assert!(pipeline.run(&at(18, 0, 0)).is_dispatch());

        match pipeline.run(&at(21, 0, 0)) {
            Outcome::ShortCircuit { stage, rejection } => {
                assert_eq!(stage, "time_window");
                assert_eq!(rejection.status(), axum::http::StatusCode::FORBIDDEN);
            }
            Outcome::Dispatch => panic!("21:00 must be rejected"),
        }
    }

    #[test]
    fn test_wrapping_window() {
        let gate = TimeWindowGate::new(22, 6);
        assert!(gate.allows(23));
        assert!(gate.allows(0));
        assert!(gate.allows(5));
        assert!(!gate.allows(6));
        assert!(!gate.allows(12));
    }

    #[test]
    fn test_end_of_day() {
        let gate = TimeWindowGate::new(20, 24);
        assert!(gate.allows(23));
        assert!(!gate.allows(0));
    }
}
