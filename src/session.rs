use crate::angle::{triple_angle, DEFAULT_MIN_CONFIDENCE};
use crate::catalog::ExerciseDefinition;
use crate::events::CounterEvent;
use crate::joints::JointFrame;
use crate::machine::{Phase, RepStateMachine, Thresholds, Transition};
use crate::milestone::{MilestoneTracker, DEFAULT_MILESTONE_INTERVAL};
use crate::policy::{CountingPolicy, SideReadings};
use crate::side::select;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub min_confidence: f64,
    pub milestone_interval: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
        }
    }
}

/// Counting state for one selected exercise.
///
/// Holds its own snapshot of the definition, so reloading the catalog
/// never changes the thresholds under a running session.
#[derive(Debug, Clone)]
pub struct CounterSession {
    exercise: Arc<ExerciseDefinition>,
    config: SessionConfig,
    policy: CountingPolicy,
    machine: RepStateMachine,
    milestones: MilestoneTracker,
    count: u32,
    last_angle: Option<f64>,
}

impl CounterSession {
    pub fn new(exercise: Arc<ExerciseDefinition>, config: SessionConfig) -> Self {
        Self {
            policy: CountingPolicy::for_exercise(&exercise),
            machine: RepStateMachine::new(Thresholds::from(exercise.as_ref())),
            milestones: MilestoneTracker::new(config.milestone_interval),
            exercise,
            config,
            count: 0,
            last_angle: None,
        }
    }

    pub fn exercise(&self) -> &Arc<ExerciseDefinition> {
        &self.exercise
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise.id
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn last_angle(&self) -> Option<f64> {
        self.last_angle
    }

    pub fn milestone_counter(&self) -> u32 {
        self.milestones.reached
    }

    pub fn policy(&self) -> CountingPolicy {
        self.policy
    }

    /// Runs one frame through angle measurement, side selection and the state machine
    pub fn update(&mut self, frame: &JointFrame) -> Vec<CounterEvent> {
        let min_confidence = self.config.min_confidence;
        let left = triple_angle(frame, &self.exercise.left_keypoints, min_confidence);
        let right = triple_angle(frame, &self.exercise.right_keypoints, min_confidence);

        let Some((angle, side)) = select(
            left.angle,
            right.angle,
            left.confidence,
            right.confidence,
            self.exercise.is_leg_exercise,
        ) else {
            return Vec::new();
        };

        self.last_angle = Some(angle);
        let mut events = vec![CounterEvent::AngleSample {
            exercise_id: self.exercise.id.clone(),
            side,
            angle,
        }];

        let readings = SideReadings {
            left: left.angle,
            right: right.angle,
            selected: Some(angle),
        };
        if let Some(transition) = self.policy.apply(&mut self.machine, &readings) {
            events.push(CounterEvent::PhaseChanged {
                exercise_id: self.exercise.id.clone(),
                phase: self.machine.phase(),
            });
            if transition == Transition::RepCompleted {
                events.extend(self.on_rep_completed());
            }
        }
        events
    }

    /// Counts one rep, plus a milestone event when the count hits the interval
    pub fn on_rep_completed(&mut self) -> Vec<CounterEvent> {
        self.count = self.count.saturating_add(1);
        let mut events = vec![CounterEvent::RepCompleted {
            exercise_id: self.exercise.id.clone(),
            new_count: self.count,
        }];
        if self.milestones.on_count(self.count) {
            events.push(CounterEvent::MilestoneReached {
                exercise_id: self.exercise.id.clone(),
                count: self.count,
            });
        }
        events
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.machine.reset();
        self.policy.reset();
        self.milestones.reset();
    }

    /// Manual correction; the count never drops below zero and the phase is untouched
    pub fn adjust(&mut self, delta: i64) -> u32 {
        let adjusted = (i64::from(self.count) + delta).clamp(0, i64::from(u32::MAX));
        self.count = u32::try_from(adjusted).unwrap_or(u32::MAX);
        self.count
    }
}
