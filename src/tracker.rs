use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::events::CounterEvent;
use crate::joints::JointFrame;
use crate::session::{CounterSession, SessionConfig};
use std::collections::HashMap;
use tracing::info;

/// Owns the exercise catalog and the counter sessions for one video stream.
///
/// Exactly one session counts at a time. Switching exercises parks the
/// previous session without touching it.
#[derive(Debug)]
pub struct RepTracker {
    catalog: Catalog,
    config: SessionConfig,
    sessions: HashMap<String, CounterSession>,
    active: Option<String>,
}

impl RepTracker {
    pub fn new(catalog: Catalog, config: SessionConfig) -> Self {
        Self {
            catalog,
            config,
            sessions: HashMap::new(),
            active: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Starts a fresh session for `id` and makes it the counting one.
    ///
    /// Selecting the exercise that is already active keeps its session.
    pub fn select_exercise(&mut self, id: &str) -> Result<&CounterSession, CatalogError> {
        let exercise = self.catalog.get(id)?;
        if self.active.as_deref() != Some(id) {
            info!(exercise = %id, "selected exercise");
            self.sessions
                .insert(id.to_string(), CounterSession::new(exercise, self.config));
            self.active = Some(id.to_string());
        }
        self.session(id).ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Makes a parked session the counting one again, without resetting it
    pub fn resume_exercise(&mut self, id: &str) -> Result<&CounterSession, CatalogError> {
        if !self.sessions.contains_key(id) {
            return self.select_exercise(id);
        }
        info!(exercise = %id, "resumed exercise");
        self.active = Some(id.to_string());
        self.session(id).ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Drops the active session
    pub fn deselect(&mut self) -> Option<CounterSession> {
        let id = self.active.take()?;
        info!(exercise = %id, "deselected exercise");
        self.sessions.remove(&id)
    }

    pub fn active_session(&self) -> Option<&CounterSession> {
        self.active.as_deref().and_then(|id| self.sessions.get(id))
    }

    fn active_session_mut(&mut self) -> Option<&mut CounterSession> {
        let id = self.active.as_deref()?;
        self.sessions.get_mut(id)
    }

    pub fn session(&self, id: &str) -> Option<&CounterSession> {
        self.sessions.get(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &CounterSession> {
        self.sessions.values()
    }

    /// Feeds a frame to the active session; no session means no events
    pub fn process_frame(&mut self, frame: &JointFrame) -> Vec<CounterEvent> {
        match self.active_session_mut() {
            Some(session) => session.update(frame),
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) -> bool {
        match self.active_session_mut() {
            Some(session) => {
                session.reset();
                info!(exercise = %session.exercise_id(), "counter reset");
                true
            }
            None => false,
        }
    }

    /// Manual count correction on the active session, returns the new count
    pub fn adjust(&mut self, delta: i64) -> Option<u32> {
        let session = self.active_session_mut()?;
        let count = session.adjust(delta);
        info!(exercise = %session.exercise_id(), delta, count, "count adjusted");
        Some(count)
    }

    /// Swaps in a new catalog; existing sessions keep their definitions
    pub fn reload_catalog(&mut self, catalog: Catalog) {
        info!(
            exercises = catalog.len(),
            rejected = catalog.rejected().len(),
            "catalog reloaded"
        );
        self.catalog = catalog;
    }
}
