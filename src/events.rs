use crate::machine::Phase;
use crate::side::Side;
use serde::{Deserialize, Serialize};

/// Signals emitted by a counter session for UI, audio and telemetry consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CounterEvent {
    AngleSample {
        exercise_id: String,
        side: Side,
        angle: f64,
    },
    PhaseChanged {
        exercise_id: String,
        phase: Phase,
    },
    RepCompleted {
        exercise_id: String,
        new_count: u32,
    },
    MilestoneReached {
        exercise_id: String,
        count: u32,
    },
}

impl CounterEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CounterEvent::AngleSample { .. } => "angle_sample",
            CounterEvent::PhaseChanged { .. } => "phase_changed",
            CounterEvent::RepCompleted { .. } => "rep_completed",
            CounterEvent::MilestoneReached { .. } => "milestone_reached",
        }
    }

    pub fn exercise_id(&self) -> &str {
        match self {
            CounterEvent::AngleSample { exercise_id, .. }
            | CounterEvent::PhaseChanged { exercise_id, .. }
            | CounterEvent::RepCompleted { exercise_id, .. }
            | CounterEvent::MilestoneReached { exercise_id, .. } => exercise_id,
        }
    }

    pub fn is_rep(&self) -> bool {
        matches!(self, CounterEvent::RepCompleted { .. })
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self, CounterEvent::MilestoneReached { .. })
    }
}
