//! # Engine configuration.
//!
//! Provides [`Config`], the settings an [`Engine`](crate::Engine) is built with.
//!
//! ## Sentinel values
//! - `fetch_timeout = 0s` → no timeout on data-source calls
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::slot::Admission;

/// Captions used by the independent composition when none are configured.
pub const DEFAULT_CAPTIONS: [&str; 4] = ["Yolo", "W11K", "OMG", "Lolz"];

/// Engine configuration.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `fetch_timeout`: per-call timeout for data-source requests (`0s` = none)
/// - `captions`: texts the independent composition picks from
/// - `admission`: policy of slots created by the engine
///
/// All fields are public. Prefer the helper accessors over checking sentinels inline.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel.
    ///
    /// Subscribers lagging behind more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// Timeout applied to every data-source call.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = the call's task fails with `TaskError::Timeout` when exceeded
    pub fetch_timeout: Duration,

    /// Captions for "cat says" compositions.
    ///
    /// Picking from an empty list fails the chain with `TaskError::Empty`.
    pub captions: Vec<String>,

    /// Admission policy of engine-created slots.
    pub admission: Admission,
}

impl Config {
    /// Returns the data-source timeout as an `Option`.
    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.fetch_timeout == Duration::ZERO {
            None
        } else {
            Some(self.fetch_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// - `bus_capacity = 1024`
    /// - `fetch_timeout = 0s` (no timeout)
    /// - `captions = ["Yolo", "W11K", "OMG", "Lolz"]`
    /// - `admission = Admission::Replace`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            fetch_timeout: Duration::ZERO,
            captions: DEFAULT_CAPTIONS.iter().map(|c| c.to_string()).collect(),
            admission: Admission::Replace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_none_and_min() {
        let mut cfg = Config::default();
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.captions, DEFAULT_CAPTIONS);

        cfg.fetch_timeout = Duration::from_secs(3);
        cfg.bus_capacity = 0;
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
