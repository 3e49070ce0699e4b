use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::{FLAKE_EPOCH, TimeSource};

/// A wall-clock time source backed by [`SystemTime`].
///
/// Every call reads the system clock, so readings follow NTP steps and manual
/// adjustments, including backwards ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a clock aligned to [`FLAKE_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(FLAKE_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a clock using `epoch` (a [`Duration`] since 1970-01-01 UTC)
    /// as the origin.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    /// The origin readings are measured from, as a [`Duration`] since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    /// Milliseconds elapsed since the epoch. A system clock set before the
    /// epoch reads as zero.
    fn current_millis(&self) -> u64 {
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        since_unix.saturating_sub(self.epoch).as_millis() as u64
    }
}
