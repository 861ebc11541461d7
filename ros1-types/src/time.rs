//! `time` and `duration` builtins

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// ROS1 `time`: seconds and nanoseconds since the epoch, both unsigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Time {
    /// Seconds
    pub secs: u32,
    /// Nanoseconds
    pub nsecs: u32,
}

impl Time {
    /// Create a new time value
    #[must_use]
    pub const fn new(secs: u32, nsecs: u32) -> Self {
        Self { secs, nsecs }
    }

    /// Total nanoseconds
    #[must_use]
    pub const fn to_nanos(&self) -> u64 {
        self.secs as u64 * 1_000_000_000 + self.nsecs as u64
    }

    /// Check if this is the zero time
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.secs == 0 && self.nsecs == 0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nsecs)
    }
}

/// ROS1 `duration`: signed seconds and nanoseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    /// Seconds
    pub secs: i32,
    /// Nanoseconds
    pub nsecs: i32,
}

impl Duration {
    /// Create a new duration value
    #[must_use]
    pub const fn new(secs: i32, nsecs: i32) -> Self {
        Self { secs, nsecs }
    }

    /// Total nanoseconds
    #[must_use]
    pub const fn to_nanos(&self) -> i64 {
        self.secs as i64 * 1_000_000_000 + self.nsecs as i64
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.to_nanos();
        let sign = if nanos < 0 { "-" } else { "" };
        let abs = nanos.unsigned_abs();
        write!(f, "{sign}{}.{:09}", abs / 1_000_000_000, abs % 1_000_000_000)
    }
}
