/// Default number of reps between milestone notifications
pub const DEFAULT_MILESTONE_INTERVAL: u32 = 10;

/// Tracks which multiples of the milestone interval have been announced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneTracker {
    /// Reps per milestone, 0 turns milestones off
    pub interval: u32,
    /// Number of milestones reached so far
    pub reached: u32,
}

impl MilestoneTracker {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            reached: 0,
        }
    }

    /// Checks a freshly completed rep count; true when it lands on a milestone
    pub fn on_count(&mut self, count: u32) -> bool {
        if self.interval == 0 || count == 0 || count % self.interval != 0 {
            return false;
        }
        self.reached = count / self.interval;
        true
    }

    pub fn reset(&mut self) {
        self.reached = 0;
    }
}

impl Default for MilestoneTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MILESTONE_INTERVAL)
    }
}
