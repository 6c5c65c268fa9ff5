use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::FrameError;
use crate::events::CounterEvent;
use crate::joints::JointFrame;
use crate::resequence::Resequencer;
use crate::tracker::RepTracker;

/// UI actions, applied between frames so they never race a frame update
#[derive(Debug, Clone)]
pub enum Control {
    Select(String),
    Resume(String),
    Deselect,
    Reset,
    Adjust(i64),
    Reload(Catalog),
}

/// Source of pose estimation results
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended
    fn next_frame(&mut self) -> Option<Result<JointFrame, FrameError>>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Option<Result<JointFrame, FrameError>> {
        (**self).next_frame()
    }
}

/// Reads one JSON frame per line, skipping blank lines
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Option<Result<JointFrame, FrameError>> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(line).map_err(|source| FrameError::Parse {
                        line: self.line_no,
                        source,
                    }));
                }
                Err(e) => return Some(Err(FrameError::Io(e))),
            }
        }
    }
}

/// Frames handed over by inference workers, possibly out of order
pub struct ChannelSource {
    rx: Receiver<JointFrame>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<JointFrame>) -> Self {
        Self { rx }
    }
}

impl FrameSource for ChannelSource {
    fn next_frame(&mut self) -> Option<Result<JointFrame, FrameError>> {
        self.rx.recv().ok().map(Ok)
    }
}

/// Cloneable sender side of the control queue
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: Sender<Control>,
}

impl ControlHandle {
    /// Queues a control action; false once the pipeline is gone
    pub fn send(&self, control: Control) -> bool {
        self.tx.send(control).is_ok()
    }

    pub fn select_exercise(&self, id: impl Into<String>) -> bool {
        self.send(Control::Select(id.into()))
    }

    pub fn reset(&self) -> bool {
        self.send(Control::Reset)
    }

    pub fn adjust(&self, delta: i64) -> bool {
        self.send(Control::Adjust(delta))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_read: u64,
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub reps: u64,
    pub milestones: u64,
}

/// Single writer for a tracker: frames and control actions are applied one at a time
pub struct Pipeline {
    tracker: RepTracker,
    controls: Receiver<Control>,
    resequencer: Resequencer,
    summary: RunSummary,
}

impl Pipeline {
    pub fn new(tracker: RepTracker, resequencer: Resequencer) -> (Self, ControlHandle) {
        let (tx, rx) = mpsc::channel();
        let pipeline = Self {
            tracker,
            controls: rx,
            resequencer,
            summary: RunSummary::default(),
        };
        (pipeline, ControlHandle { tx })
    }

    pub fn tracker(&self) -> &RepTracker {
        &self.tracker
    }

    pub fn into_tracker(self) -> RepTracker {
        self.tracker
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames_dropped: self.resequencer.dropped(),
            ..self.summary
        }
    }

    /// Applies every queued control action
    pub fn apply_controls(&mut self) {
        loop {
            match self.controls.try_recv() {
                Ok(control) => self.apply(control),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply(&mut self, control: Control) {
        match control {
            Control::Select(id) => {
                if let Err(e) = self.tracker.select_exercise(&id) {
                    warn!(error = %e, "ignoring exercise selection");
                }
            }
            Control::Resume(id) => {
                if let Err(e) = self.tracker.resume_exercise(&id) {
                    warn!(error = %e, "ignoring exercise resume");
                }
            }
            Control::Deselect => {
                self.tracker.deselect();
            }
            Control::Reset => {
                self.tracker.reset();
            }
            Control::Adjust(delta) => {
                self.tracker.adjust(delta);
            }
            Control::Reload(catalog) => self.tracker.reload_catalog(catalog),
        }
    }

    /// Accepts one frame and returns the events of every frame it released
    pub fn push_frame(&mut self, frame: JointFrame) -> Vec<CounterEvent> {
        self.summary.frames_read += 1;
        self.apply_controls();
        let ready = self.resequencer.push(frame);
        self.process(ready)
    }

    /// Processes frames still held by the resequencer
    pub fn finish(&mut self) -> Vec<CounterEvent> {
        self.apply_controls();
        let remaining = self.resequencer.flush();
        self.process(remaining)
    }

    fn process(&mut self, frames: Vec<JointFrame>) -> Vec<CounterEvent> {
        let mut events = Vec::new();
        for frame in frames {
            self.summary.frames_processed += 1;
            events.extend(self.tracker.process_frame(&frame));
        }
        self.summary.reps += events.iter().filter(|e| e.is_rep()).count() as u64;
        self.summary.milestones += events.iter().filter(|e| e.is_milestone()).count() as u64;
        events
    }

    /// Drains `source`, passing every event to `sink`
    pub fn run<S, F>(&mut self, source: &mut S, mut sink: F) -> Result<RunSummary, FrameError>
    where
        S: FrameSource,
        F: FnMut(&CounterEvent),
    {
        while let Some(frame) = source.next_frame() {
            for event in self.push_frame(frame?) {
                sink(&event);
            }
        }
        for event in self.finish() {
            sink(&event);
        }

        let summary = self.summary();
        info!(
            frames = summary.frames_read,
            processed = summary.frames_processed,
            dropped = summary.frames_dropped,
            reps = summary.reps,
            "frame stream finished"
        );
        Ok(summary)
    }
}
