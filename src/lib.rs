// Library surface for the counting engine; main.rs only wires it to files and stdout.
pub mod angle;
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod joints;
pub mod machine;
pub mod milestone;
pub mod policy;
pub mod resequence;
pub mod runtime;
pub mod session;
pub mod side;
pub mod telemetry;
pub mod tracker;
pub mod util;

pub use catalog::{Catalog, CatalogSource, ExerciseDefinition};
pub use error::{CatalogError, FrameError, ValidationError};
pub use events::CounterEvent;
pub use joints::{Joint, JointFrame, Landmark};
pub use machine::Phase;
pub use session::{CounterSession, SessionConfig};
pub use side::Side;
pub use tracker::RepTracker;
