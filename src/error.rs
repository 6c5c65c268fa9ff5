use std::path::PathBuf;
use thiserror::Error;

/// Errors that fail a whole catalog load or lookup
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read exercise catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("exercise catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid exercise catalog: {0}")]
    InvalidDocument(String),

    #[error("unknown exercise: {0}")]
    NotFound(String),
}

/// Why a single exercise definition was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    #[error("definition must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must be a number")]
    NonNumericAngle(&'static str),

    #[error("field `{field}` is {value}, expected a value between 0 and 360 (exclusive)")]
    AngleOutOfRange { field: &'static str, value: f64 },

    #[error("down_angle and up_angle must differ (both are {0})")]
    IdenticalThresholds(f64),

    #[error("field `{field}` must list exactly 3 keypoints, found {len}")]
    KeypointArity { field: &'static str, len: usize },

    #[error("field `{field}` references unknown keypoint {value}")]
    UnknownKeypoint { field: &'static str, value: String },

    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
}

/// A rejected exercise definition; other definitions in the same document still load
#[derive(Error, Debug, Clone, PartialEq)]
#[error("exercise `{exercise_id}`: {kind}")]
pub struct ValidationError {
    pub exercise_id: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(exercise_id: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            kind,
        }
    }
}

/// Errors reading joint frames from an input stream
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("failed to read frames: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid frame: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
