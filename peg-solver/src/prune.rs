//! Leg-loss detection.
//!
//! Pins left on the short arms of the cross are expensive: clearing an arm
//! needs pins brought in from the middle. An arm with any pin on its border
//! run is "lost", and each lost arm ties up `pins_per_leg` free pins. A
//! position with too many lost arms and too few free pins is abandoned.
//!
//! This is a necessary-condition check only. It misses some hopeless
//! positions, which costs search time but never correctness.

use peg_core::{Board, Leg};

use crate::config::SearchConfig;

/// Leg summary of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegReport {
    /// Arms with at least one pin on their border run.
    pub lost_legs: usize,
    /// Pins not sitting on any border run.
    pub free_pins: usize,
}

/// Decides whether a position can be abandoned early.
#[derive(Clone, Copy, Debug)]
pub struct LegLossDetector {
    prune_below_pins: usize,
    min_lost_legs: usize,
    pins_per_leg: usize,
}

impl LegLossDetector {
    pub fn new(prune_below_pins: usize, min_lost_legs: usize, pins_per_leg: usize) -> Self {
        Self {
            prune_below_pins,
            min_lost_legs,
            pins_per_leg,
        }
    }

    /// Detector for a search configuration, or `None` with pruning disabled.
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        config.prune.then(|| {
            Self::new(
                config.prune_below_pins,
                config.min_lost_legs,
                config.pins_per_leg,
            )
        })
    }

    /// Only positions with few pins left are worth checking.
    #[inline]
    pub fn applies(&self, board: &Board) -> bool {
        board.num_pins() < self.prune_below_pins
    }

    pub fn assess(&self, board: &Board) -> LegReport {
        let mut lost_legs = 0;
        let mut edge_pins = 0;
        for leg in Leg::ALL {
            let pinned = board
                .leg(leg)
                .iter()
                .filter(|&&index| board.is_occupied(index))
                .count();
            if pinned > 0 {
                lost_legs += 1;
                edge_pins += pinned;
            }
        }
        LegReport {
            lost_legs,
            free_pins: board.num_pins() - edge_pins,
        }
    }

    /// Position cannot be cleared: enough lost legs and not enough free pins
    /// to clear them.
    pub fn is_lost(&self, board: &Board) -> bool {
        let report = self.assess(board);
        report.lost_legs >= self.min_lost_legs
            && report.free_pins < self.pins_per_leg * report.lost_legs
    }
}

impl Default for LegLossDetector {
    fn default() -> Self {
        let config = SearchConfig::default();
        Self::new(
            config.prune_below_pins,
            config.min_lost_legs,
            config.pins_per_leg,
        )
    }
}
