//! Refresh state machine.
//!
//! One refresh cycle walks
//!
//! ```text
//! Idle -> Encoding -> TransmittingGroup(0) -> Holding(0) -> ... -> Holding(GROUPS-1) -> Idle
//! ```
//!
//! With [`RefreshPolicy::Chained`] the last hold leads straight back to
//! `Encoding` instead of `Idle`. The transitions here are pure; the
//! [`RefreshScheduler`](crate::RefreshScheduler) performs the side effects
//! that belong to each state.

use embassy_time::Duration;

use crate::geometry::GROUPS;

/// What starts a refresh cycle.
///
/// A scheduler uses exactly one policy for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshPolicy {
    /// A fixed-rate tick starts each cycle. Ticks that come due while a cycle
    /// is still running are coalesced into one.
    Periodic {
        /// Time between ticks
        interval: Duration,
    },
    /// Each cycle starts as soon as the previous one ends. The rate is set by
    /// the bus speed and hold window.
    Chained,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::Periodic {
            interval: Duration::from_hz(240),
        }
    }
}

/// Position of the refresh cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshState {
    /// Waiting for the next trigger.
    #[default]
    Idle,
    /// Snapshotting the surface and rebuilding the frame.
    Encoding,
    /// Writing group `g` to the bus.
    TransmittingGroup(u8),
    /// Holding chip-select released after group `g`.
    Holding(u8),
}

/// Result of a periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// The machine was idle and starts a cycle.
    Start(RefreshState),
    /// A cycle is in flight; the tick is folded into the next one.
    Coalesced,
}

impl RefreshState {
    /// State after the current one completes normally.
    #[must_use]
    pub const fn advance(self, policy: RefreshPolicy) -> Self {
        match self {
            Self::Idle => Self::Encoding,
            Self::Encoding => Self::TransmittingGroup(0),
            Self::TransmittingGroup(g) => Self::Holding(g),
            Self::Holding(g) if (g as usize) + 1 < GROUPS => Self::TransmittingGroup(g + 1),
            Self::Holding(_) => Self::cycle_end(policy),
        }
    }

    /// State after a failed bus or chip-select operation abandons the cycle.
    #[must_use]
    pub const fn abandon(self, policy: RefreshPolicy) -> Self {
        Self::cycle_end(policy)
    }

    /// React to a periodic tick.
    #[must_use]
    pub const fn on_tick(self) -> TickOutcome {
        match self {
            Self::Idle => TickOutcome::Start(Self::Encoding),
            _ => TickOutcome::Coalesced,
        }
    }

    /// Whether a refresh cycle is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }

    const fn cycle_end(policy: RefreshPolicy) -> Self {
        match policy {
            RefreshPolicy::Periodic { .. } => Self::Idle,
            RefreshPolicy::Chained => Self::Encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use super::*;

    const PERIODIC: RefreshPolicy = RefreshPolicy::Periodic {
        interval: Duration::from_millis(4),
    };

    fn walk(start: RefreshState, policy: RefreshPolicy, steps: usize) -> Vec<RefreshState> {
        let mut states = vec![start];
        let mut state = start;
        for _ in 0..steps {
            state = state.advance(policy);
            states.push(state);
        }
        states
    }

    #[test]
    fn test_periodic_cycle_order() {
        use RefreshState::*;
        assert_eq!(
            walk(Idle, PERIODIC, 10),
            [
                Idle,
                Encoding,
                TransmittingGroup(0),
                Holding(0),
                TransmittingGroup(1),
                Holding(1),
                TransmittingGroup(2),
                Holding(2),
                TransmittingGroup(3),
                Holding(3),
                Idle,
            ]
        );
    }

    #[test]
    fn test_chained_cycle_returns_to_encoding() {
        use RefreshState::*;
        let states = walk(Encoding, RefreshPolicy::Chained, 9);
        assert_eq!(states.first(), Some(&Encoding));
        assert_eq!(states.last(), Some(&Encoding));
        assert!(!states.contains(&Idle));
    }

    #[test]
    fn test_each_group_transmitted_once_in_order() {
        let states = walk(RefreshState::Encoding, PERIODIC, 9);
        let groups: Vec<u8> = states
            .iter()
            .filter_map(|s| match s {
                RefreshState::TransmittingGroup(g) => Some(*g),
                _ => None,
            })
            .collect();
        assert_eq!(groups, [0, 1, 2, 3]);

        // every transmit is followed by the hold for the same group
        for pair in states.windows(2) {
            if let RefreshState::TransmittingGroup(g) = pair[0] {
                assert_eq!(pair[1], RefreshState::Holding(g));
            }
        }
    }

    #[test]
    fn test_abandon() {
        assert_eq!(
            RefreshState::TransmittingGroup(2).abandon(PERIODIC),
            RefreshState::Idle
        );
        assert_eq!(
            RefreshState::Holding(1).abandon(RefreshPolicy::Chained),
            RefreshState::Encoding
        );
    }

    #[test]
    fn test_tick_coalesced_while_busy() {
        assert_eq!(
            RefreshState::Idle.on_tick(),
            TickOutcome::Start(RefreshState::Encoding)
        );
        for state in [
            RefreshState::Encoding,
            RefreshState::TransmittingGroup(0),
            RefreshState::Holding(3),
        ] {
            assert_eq!(state.on_tick(), TickOutcome::Coalesced);
            assert!(state.is_busy());
        }
        assert!(!RefreshState::Idle.is_busy());
    }

    #[test]
    fn test_default_policy_is_240hz() {
        assert_eq!(
            RefreshPolicy::default(),
            RefreshPolicy::Periodic {
                interval: Duration::from_hz(240)
            }
        );
        assert_eq!(RefreshState::default(), RefreshState::Idle);
    }
}
