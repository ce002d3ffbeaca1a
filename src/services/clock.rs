use crate::config::ClockConfig;
use time::OffsetDateTime;

/// Request header carrying a simulated "now" in milliseconds, honored in test mode only.
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Always the host wall clock.
    Real,
    /// A per-request injected value, falling back to the wall clock.
    Injected,
}

/// Resolves the logical time for a single request.
///
/// The mode is fixed at startup. The resolved value is passed explicitly into the
/// paste service so that concurrent requests can each carry their own time.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    mode: ClockMode,
}

impl Clock {
    #[must_use]
    pub const fn new(mode: ClockMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn from_config(config: &ClockConfig) -> Self {
        if config.test_mode { Self::new(ClockMode::Injected) } else { Self::new(ClockMode::Real) }
    }

    #[must_use]
    pub const fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Returns the current time in milliseconds.
    ///
    /// `injected` is ignored in real mode. In injected mode a value that is absent or
    /// not a base-10 integer falls back to the wall clock.
    #[must_use]
    pub fn now_ms(&self, injected: Option<&str>) -> i64 {
        match self.mode {
            ClockMode::Injected => injected.and_then(|raw| raw.trim().parse::<i64>().ok()).unwrap_or_else(wall_clock_ms),
            ClockMode::Real => wall_clock_ms(),
        }
    }
}

#[must_use]
pub fn wall_clock_ms() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
