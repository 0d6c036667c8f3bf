//! Time sources for the pipeline.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Supplies the arrival time stamped onto each request.
pub trait Clock: Send + Sync {
    /// Monotonic instant, used for rate-limit windows.
    fn now(&self) -> Instant;

    /// Wall-clock time in the server's local zone, used for the hour gate and log lines.
    fn local_now(&self) -> DateTime<Local>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(Instant, DateTime<Local>)>,
}

impl ManualClock {
    pub fn new(local: DateTime<Local>) -> Self {
        Self {
            state: Mutex::new((Instant::now(), local)),
        }
    }

    /// A clock set to `hour:00:00` local time on a fixed winter date.
    pub fn at_hour(hour: u32) -> Option<Self> {
        local_at_hour(hour).map(Self::new)
    }

    /// Move both the monotonic and the wall clock forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.0 += by;
        if let Some(local) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|delta| state.1.checked_add_signed(delta))
        {
            state.1 = local;
        }
    }

    /// Jump the wall clock to a given hour without touching the monotonic clock.
    pub fn set_hour(&self, hour: u32) {
        if let Some(local) = local_at_hour(hour) {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            state.1 = local;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).0
    }

    fn local_now(&self) -> DateTime<Local> {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).1
    }
}

fn local_at_hour(hour: u32) -> Option<DateTime<Local>> {
    let naive = NaiveDate::from_ymd_opt(2026, 1, 15)?.and_hms_opt(hour, 0, 0)?;
    Local.from_local_datetime(&naive).earliest()
}
