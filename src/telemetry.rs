use crate::events::CounterEvent;
use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct EventRow<'a> {
    date: String,
    event: &'static str,
    exercise_id: &'a str,
    side: Option<String>,
    angle: Option<String>,
    phase: Option<String>,
    count: Option<u32>,
}

impl<'a> From<&'a CounterEvent> for EventRow<'a> {
    fn from(event: &'a CounterEvent) -> Self {
        let mut row = EventRow {
            date: Local::now().to_rfc3339(),
            event: event.kind(),
            exercise_id: event.exercise_id(),
            side: None,
            angle: None,
            phase: None,
            count: None,
        };
        match event {
            CounterEvent::AngleSample { side, angle, .. } => {
                row.side = Some(side.to_string());
                row.angle = Some(format!("{angle:.2}"));
            }
            CounterEvent::PhaseChanged { phase, .. } => row.phase = Some(phase.to_string()),
            CounterEvent::RepCompleted { new_count, .. } => row.count = Some(*new_count),
            CounterEvent::MilestoneReached { count, .. } => row.count = Some(*count),
        }
        row
    }
}

/// CSV sink for counter events
pub struct EventLog<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> EventLog<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn record(&mut self, event: &CounterEvent) -> csv::Result<()> {
        self.writer.serialize(EventRow::from(event))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl EventLog<std::fs::File> {
    /// Appends to `path`, writing the header only when the file is new
    pub fn append_to<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = !path.exists();
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        Ok(Self { writer })
    }
}
