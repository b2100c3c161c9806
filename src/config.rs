//! Display configuration, supplied once at bring-up.

use embassy_time::{Duration, TICK_HZ};

use crate::chip_select::Polarity;
use crate::error::ConfigError;
use crate::geometry::{Geometry, GROUPS};
use crate::state::RefreshPolicy;

/// Default chip-select hold window after each group.
pub const DEFAULT_HOLD: Duration = Duration::from_micros(50);

/// Default bus clock.
pub const DEFAULT_BUS_HZ: u32 = 10_000_000;

/// Board and timing parameters for one display.
///
/// # Example
/// ```rust
/// use buse_framebuffer::{Config, RefreshPolicy};
/// use embassy_time::Duration;
///
/// let config = Config::new(128, 19, 4)
///     .with_bus_hz(8_000_000)
///     .with_hold(Duration::from_micros(80))
///     .with_policy(RefreshPolicy::Chained);
/// assert_eq!(config.geometry().unwrap().frame_bytes(), 400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Display width in pixels
    pub width: usize,
    /// Display height in pixels
    pub height: usize,
    /// Number of panels side by side
    pub panels: usize,
    /// Bus clock the SPI peripheral was configured with
    pub bus_hz: u32,
    /// Chip-select hold window; longer is brighter
    pub hold: Duration,
    /// What starts a refresh cycle
    pub policy: RefreshPolicy,
    /// Level that asserts chip-select
    pub cs_polarity: Polarity,
}

impl Config {
    /// Configuration for a `width` × `height` display over `panels` panels
    /// with default timing.
    #[must_use]
    pub const fn new(width: usize, height: usize, panels: usize) -> Self {
        Self {
            width,
            height,
            panels,
            bus_hz: DEFAULT_BUS_HZ,
            hold: DEFAULT_HOLD,
            policy: RefreshPolicy::Periodic {
                interval: Duration::from_hz(240),
            },
            cs_polarity: Polarity::ActiveHigh,
        }
    }

    /// Set the bus clock.
    #[must_use]
    pub const fn with_bus_hz(mut self, bus_hz: u32) -> Self {
        self.bus_hz = bus_hz;
        self
    }

    /// Set the hold window.
    #[must_use]
    pub const fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Set the refresh policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the chip-select polarity.
    #[must_use]
    pub const fn with_cs_polarity(mut self, cs_polarity: Polarity) -> Self {
        self.cs_polarity = cs_polarity;
        self
    }

    /// Resolve and validate the frame layout.
    ///
    /// # Errors
    ///
    /// See [`Geometry::new`].
    pub const fn geometry(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(self.width, self.height, self.panels)
    }

    /// Hold window in nanoseconds, saturated to `u32`.
    #[must_use]
    pub fn hold_ns(&self) -> u32 {
        let ns = u128::from(self.hold.as_ticks()) * 1_000_000_000 / u128::from(TICK_HZ);
        u32::try_from(ns).unwrap_or(u32::MAX)
    }

    /// Time one full cycle occupies the bus plus hold windows.
    ///
    /// This is the period of [`RefreshPolicy::Chained`]; a periodic interval
    /// shorter than this will coalesce ticks.
    ///
    /// # Errors
    ///
    /// See [`Geometry::new`].
    pub fn estimated_cycle_time(&self) -> Result<Duration, ConfigError> {
        let geometry = self.geometry()?;
        let bits = (geometry.group_bytes() as u64) * 8;
        let transmit_ns = (bits * 1_000_000_000).div_ceil(u64::from(self.bus_hz.max(1)));
        let per_group = Duration::from_nanos(transmit_ns) + self.hold;
        Ok(per_group * GROUPS as u32)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            crate::buse128x19::WIDTH,
            crate::buse128x19::HEIGHT,
            crate::buse128x19::PANELS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.width, 128);
        assert_eq!(config.height, 19);
        assert_eq!(config.panels, 4);
        assert_eq!(config.hold, Duration::from_micros(50));
        assert_eq!(config.policy, RefreshPolicy::default());
        assert_eq!(config.cs_polarity, Polarity::ActiveHigh);
        assert_eq!(config.bus_hz, DEFAULT_BUS_HZ);
    }

    #[test]
    fn test_builder() {
        let config = Config::new(64, 8, 2)
            .with_bus_hz(1_000_000)
            .with_hold(Duration::from_micros(10))
            .with_policy(RefreshPolicy::Chained)
            .with_cs_polarity(Polarity::ActiveLow);
        assert_eq!(config.bus_hz, 1_000_000);
        assert_eq!(config.hold, Duration::from_micros(10));
        assert_eq!(config.policy, RefreshPolicy::Chained);
        assert_eq!(config.cs_polarity, Polarity::ActiveLow);
    }

    #[test]
    fn test_geometry_validation() {
        assert!(Config::default().geometry().is_ok());
        assert_eq!(
            Config::new(100, 19, 4).geometry(),
            Err(ConfigError::UnevenGroups {
                panel_cols: 25,
                groups: 4
            })
        );
    }

    #[test]
    fn test_hold_ns() {
        assert_eq!(Config::default().hold_ns(), 50_000);
        let long = Config::default().with_hold(Duration::from_secs(10));
        assert_eq!(long.hold_ns(), u32::MAX);
    }

    #[test]
    fn test_hold_ns_keeps_tick_precision() {
        // tick resolution survives, nothing is rounded to microseconds
        let config = Config::default().with_hold(Duration::from_ticks(7));
        assert_eq!(u64::from(config.hold_ns()), 7 * 1_000_000_000 / TICK_HZ);
    }

    #[test]
    fn test_estimated_cycle_time() {
        // 100 bytes at 8 MHz is 100 us, plus 50 us hold, four times
        let config = Config::default().with_bus_hz(8_000_000);
        assert_eq!(
            config.estimated_cycle_time(),
            Ok(Duration::from_micros(600))
        );
        assert!(Config::new(10, 1, 3).estimated_cycle_time().is_err());
    }
}
