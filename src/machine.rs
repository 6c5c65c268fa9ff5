//! Up/down hysteresis over a joint angle
//!
//! The machine starts in [`Phase::AwaitingDown`]. Crossing `down_angle`
//! moves it to [`Phase::AwaitingUp`]; crossing `up_angle` afterwards moves
//! it back and completes a rep. Which way "crossing" goes depends on the
//! thresholds: when `down_angle < up_angle` the first crossing happens on a
//! decreasing angle, otherwise on an increasing one. Both crossings are
//! inclusive. The gap between the thresholds is the only noise filter.

use crate::catalog::ExerciseDefinition;
use crate::util::overshoot;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    AwaitingDown,
    AwaitingUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `AwaitingDown -> AwaitingUp`
    Contracted,
    /// `AwaitingUp -> AwaitingDown`, one rep done
    RepCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub down_angle: f64,
    pub up_angle: f64,
}

impl Thresholds {
    pub fn new(down_angle: f64, up_angle: f64) -> Self {
        Self {
            down_angle,
            up_angle,
        }
    }

    fn contracts_downward(&self) -> bool {
        self.down_angle < self.up_angle
    }
}

impl From<&ExerciseDefinition> for Thresholds {
    fn from(def: &ExerciseDefinition) -> Self {
        Self::new(def.down_angle, def.up_angle)
    }
}

#[derive(Debug, Clone)]
pub struct RepStateMachine {
    thresholds: Thresholds,
    phase: Phase,
}

impl RepStateMachine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            phase: Phase::AwaitingDown,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Whether `angle` satisfies the crossing the current phase waits for
    pub fn meets_criterion(&self, angle: f64) -> bool {
        let downward = self.thresholds.contracts_downward();
        match self.phase {
            Phase::AwaitingDown => overshoot(angle, self.thresholds.down_angle, !downward) >= 0.0,
            Phase::AwaitingUp => overshoot(angle, self.thresholds.up_angle, downward) >= 0.0,
        }
    }

    /// Feeds one defined angle sample
    pub fn advance(&mut self, angle: f64) -> Option<Transition> {
        if self.meets_criterion(angle) {
            Some(self.transition())
        } else {
            None
        }
    }

    /// Moves to the other phase unconditionally
    pub fn transition(&mut self) -> Transition {
        let transition = match self.phase {
            Phase::AwaitingDown => {
                self.phase = Phase::AwaitingUp;
                Transition::Contracted
            }
            Phase::AwaitingUp => {
                self.phase = Phase::AwaitingDown;
                Transition::RepCompleted
            }
        };
        debug!(phase = %self.phase, ?transition, "phase changed");
        transition
    }

    pub fn reset(&mut self) {
        self.phase = Phase::AwaitingDown;
    }
}
