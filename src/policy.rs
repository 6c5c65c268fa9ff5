use crate::catalog::ExerciseDefinition;
use crate::machine::{RepStateMachine, Transition};

/// Per-frame angle readings for both sides of the body
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideReadings {
    pub left: Option<f64>,
    pub right: Option<f64>,
    /// Working angle picked by the side selector
    pub selected: Option<f64>,
}

/// Legs that have met the current criterion since the last transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossedSides {
    pub left: bool,
    pub right: bool,
}

/// How a session feeds its state machine, fixed when the session is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingPolicy {
    /// Advance on the selected side's angle
    SingleSide,
    /// Each leg has to meet the crossing, in any frame, before the shared phase advances
    DualSide(CrossedSides),
}

impl CountingPolicy {
    pub fn for_exercise(def: &ExerciseDefinition) -> Self {
        if def.is_leg_exercise {
            CountingPolicy::DualSide(CrossedSides::default())
        } else {
            CountingPolicy::SingleSide
        }
    }

    pub fn is_dual_side(&self) -> bool {
        matches!(self, CountingPolicy::DualSide(_))
    }

    pub fn apply(
        &mut self,
        machine: &mut RepStateMachine,
        readings: &SideReadings,
    ) -> Option<Transition> {
        match self {
            CountingPolicy::SingleSide => apply_single(machine, readings),
            CountingPolicy::DualSide(crossed) => apply_dual(crossed, machine, readings),
        }
    }

    /// Forgets partial progress, used when the machine itself is reset
    pub fn reset(&mut self) {
        if let CountingPolicy::DualSide(crossed) = self {
            *crossed = CrossedSides::default();
        }
    }
}

fn apply_single(machine: &mut RepStateMachine, readings: &SideReadings) -> Option<Transition> {
    readings.selected.and_then(|angle| machine.advance(angle))
}

fn apply_dual(
    crossed: &mut CrossedSides,
    machine: &mut RepStateMachine,
    readings: &SideReadings,
) -> Option<Transition> {
    let ready = match (readings.left, readings.right) {
        (Some(left), Some(right)) => {
            crossed.left |= machine.meets_criterion(left);
            crossed.right |= machine.meets_criterion(right);
            crossed.left && crossed.right
        }
        // a side without a sample this frame does not hold the other one back
        (Some(angle), None) | (None, Some(angle)) => machine.meets_criterion(angle),
        (None, None) => false,
    };
    if !ready {
        return None;
    }
    *crossed = CrossedSides::default();
    Some(machine.transition())
}
