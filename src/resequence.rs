//! Restores capture order for frames that were evaluated out of order

use crate::joints::JointFrame;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Default number of frames held back while waiting for a missing one
pub const DEFAULT_MAX_PENDING: usize = 8;

/// Releases frames strictly in `seq` order.
///
/// Frames older than the next expected one are dropped. When more than
/// `max_pending` frames wait behind a gap the gap is given up on.
/// Once `u64::MAX` has been released every later frame is stale.
#[derive(Debug)]
pub struct Resequencer {
    next_seq: Option<u64>,
    exhausted: bool,
    pending: BTreeMap<u64, JointFrame>,
    max_pending: usize,
    dropped: u64,
}

impl Resequencer {
    pub fn new(max_pending: usize) -> Self {
        Self {
            next_seq: None,
            exhausted: false,
            pending: BTreeMap::new(),
            max_pending,
            dropped: 0,
        }
    }

    /// Starts the sequence at `seq` instead of at the first frame seen
    pub fn starting_at(seq: u64, max_pending: usize) -> Self {
        Self {
            next_seq: Some(seq),
            ..Self::new(max_pending)
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Accepts one frame and returns every frame that is now in order
    pub fn push(&mut self, frame: JointFrame) -> Vec<JointFrame> {
        if self.exhausted {
            debug!(seq = frame.seq, "dropping frame past the end of the sequence");
            self.dropped += 1;
            return Vec::new();
        }
        let next = *self.next_seq.get_or_insert(frame.seq);
        if frame.seq < next || self.pending.contains_key(&frame.seq) {
            debug!(seq = frame.seq, next, "dropping stale frame");
            self.dropped += 1;
            return Vec::new();
        }
        self.pending.insert(frame.seq, frame);

        let mut ready = self.drain_ready();
        if self.pending.len() > self.max_pending {
            if let Some(&first) = self.pending.keys().next() {
                warn!(
                    missing_from = self.next_seq.unwrap_or(first),
                    resume_at = first,
                    "skipping frames that never arrived"
                );
                self.next_seq = Some(first);
                ready.extend(self.drain_ready());
            }
        }
        ready
    }

    /// Releases everything still buffered, in order, regardless of gaps
    pub fn flush(&mut self) -> Vec<JointFrame> {
        let frames: Vec<JointFrame> = std::mem::take(&mut self.pending).into_values().collect();
        if let Some(last) = frames.last() {
            self.advance_past(last.seq);
        }
        frames
    }

    fn drain_ready(&mut self) -> Vec<JointFrame> {
        let mut ready = Vec::new();
        while let Some(next) = self.next_seq {
            match self.pending.remove(&next) {
                Some(frame) => {
                    ready.push(frame);
                    self.advance_past(next);
                }
                None => break,
            }
        }
        ready
    }

    fn advance_past(&mut self, seq: u64) {
        self.next_seq = seq.checked_add(1);
        self.exhausted = self.next_seq.is_none();
    }
}

impl Default for Resequencer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PENDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs(frames: Vec<JointFrame>) -> Vec<u64> {
        frames.into_iter().map(|f| f.seq).collect()
    }

    #[test]
    fn test_in_order_frames_pass_through() {
        let mut r = Resequencer::default();
        assert_eq!(seqs(r.push(JointFrame::new(0))), vec![0]);
        assert_eq!(seqs(r.push(JointFrame::new(1))), vec![1]);
        assert_eq!(seqs(r.push(JointFrame::new(2))), vec![2]);
    }

    #[test]
    fn test_out_of_order_frames_are_held() {
        let mut r = Resequencer::starting_at(0, 8);
        assert!(r.push(JointFrame::new(2)).is_empty());
        assert!(r.push(JointFrame::new(1)).is_empty());
        assert_eq!(r.pending(), 2);
        assert_eq!(seqs(r.push(JointFrame::new(0))), vec![0, 1, 2]);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn test_stale_and_duplicate_frames_are_dropped() {
        let mut r = Resequencer::default();
        r.push(JointFrame::new(5));
        r.push(JointFrame::new(6));
        assert!(r.push(JointFrame::new(4)).is_empty());
        assert!(r.push(JointFrame::new(6)).is_empty());
        assert!(r.push(JointFrame::new(8)).is_empty());
        assert!(r.push(JointFrame::new(8)).is_empty());
        assert_eq!(r.dropped(), 3);
    }

    #[test]
    fn test_gap_is_skipped_when_buffer_overflows() {
        let mut r = Resequencer::starting_at(0, 2);
        assert!(r.push(JointFrame::new(1)).is_empty());
        assert!(r.push(JointFrame::new(2)).is_empty());
        assert_eq!(seqs(r.push(JointFrame::new(3))), vec![1, 2, 3]);
        assert!(r.push(JointFrame::new(0)).is_empty());
        assert_eq!(seqs(r.push(JointFrame::new(4))), vec![4]);
    }

    #[test]
    fn test_last_sequence_number_is_released_once() {
        let mut r = Resequencer::default();
        assert_eq!(seqs(r.push(JointFrame::new(u64::MAX))), vec![u64::MAX]);
        assert!(r.push(JointFrame::new(u64::MAX)).is_empty());
        assert!(r.push(JointFrame::new(0)).is_empty());
        assert_eq!(r.dropped(), 2);
        assert!(r.flush().is_empty());
    }

    #[test]
    fn test_flush_up_to_last_sequence_number() {
        let mut r = Resequencer::starting_at(u64::MAX - 2, 8);
        assert!(r.push(JointFrame::new(u64::MAX)).is_empty());
        assert_eq!(seqs(r.flush()), vec![u64::MAX]);
        assert!(r.push(JointFrame::new(u64::MAX - 1)).is_empty());
        assert_eq!(r.dropped(), 1);
    }

    #[test]
    fn test_flush_releases_remaining_frames() {
        let mut r = Resequencer::starting_at(0, 8);
        r.push(JointFrame::new(3));
        r.push(JointFrame::new(2));
        assert_eq!(seqs(r.flush()), vec![2, 3]);
        assert!(r.flush().is_empty());
        assert_eq!(seqs(r.push(JointFrame::new(4))), vec![4]);
    }
}
