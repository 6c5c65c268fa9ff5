use crate::error::{CatalogError, ValidationError, ValidationErrorKind};
use crate::joints::{Joint, KeypointTriple};
use include_dir::{include_dir, Dir};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

const BUNDLED_FILE: &str = "exercises.json";

/// A single exercise, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub display_name_primary: String,
    pub display_name_secondary: String,
    /// Threshold crossed first when leaving the rest posture
    pub down_angle: f64,
    /// Threshold crossed when returning to the rest posture
    pub up_angle: f64,
    pub left_keypoints: KeypointTriple,
    pub right_keypoints: KeypointTriple,
    pub angle_display_keypoints: KeypointTriple,
    pub is_leg_exercise: bool,
}

impl ExerciseDefinition {
    /// True when the first crossing happens on a decreasing angle
    pub fn contracts_downward(&self) -> bool {
        self.down_angle < self.up_angle
    }

    /// Parses one entry of the `exercises` map
    pub fn from_value(id: &str, entry: &Value) -> Result<Self, ValidationError> {
        let invalid = |kind| ValidationError::new(id, kind);
        let fields = entry
            .as_object()
            .ok_or_else(|| invalid(ValidationErrorKind::NotAnObject))?;

        let down_angle = read_angle(fields, "down_angle").map_err(invalid)?;
        let up_angle = read_angle(fields, "up_angle").map_err(invalid)?;
        if down_angle == up_angle {
            return Err(invalid(ValidationErrorKind::IdenticalThresholds(down_angle)));
        }

        let left_keypoints = read_triple(fields, "left_points")
            .map_err(invalid)?
            .ok_or_else(|| invalid(ValidationErrorKind::MissingField("left_points")))?;
        let right_keypoints = read_triple(fields, "right_points")
            .map_err(invalid)?
            .ok_or_else(|| invalid(ValidationErrorKind::MissingField("right_points")))?;
        let angle_display_keypoints = read_triple(fields, "angle_point")
            .map_err(invalid)?
            .unwrap_or(left_keypoints);

        let name_en = read_string(fields, "name_en").map_err(invalid)?;
        let name_zh = read_string(fields, "name_zh").map_err(invalid)?;
        let is_leg_exercise = match fields.get("is_leg_exercise") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid(ValidationErrorKind::WrongType("is_leg_exercise"))),
        };

        Ok(Self {
            id: id.to_string(),
            display_name_primary: name_en.unwrap_or_else(|| id.to_string()),
            display_name_secondary: name_zh.unwrap_or_else(|| id.to_string()),
            down_angle,
            up_angle,
            left_keypoints,
            right_keypoints,
            angle_display_keypoints,
            is_leg_exercise,
        })
    }
}

fn read_angle(fields: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationErrorKind> {
    let value = fields
        .get(field)
        .ok_or(ValidationErrorKind::MissingField(field))?
        .as_f64()
        .ok_or(ValidationErrorKind::NonNumericAngle(field))?;
    if value <= 0.0 || value >= 360.0 {
        return Err(ValidationErrorKind::AngleOutOfRange { field, value });
    }
    Ok(value)
}

fn read_triple(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<KeypointTriple>, ValidationErrorKind> {
    let items = match fields.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationErrorKind::WrongType(field)),
    };
    if items.len() != 3 {
        return Err(ValidationErrorKind::KeypointArity {
            field,
            len: items.len(),
        });
    }

    let mut triple = [Joint::Nose; 3];
    for (slot, item) in triple.iter_mut().zip(items) {
        *slot = resolve_keypoint(item).ok_or_else(|| ValidationErrorKind::UnknownKeypoint {
            field,
            value: item.to_string(),
        })?;
    }
    Ok(Some(triple))
}

fn resolve_keypoint(item: &Value) -> Option<Joint> {
    match item {
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(Joint::from_index),
        Value::String(name) => Joint::from_name(name),
        _ => None,
    }
}

fn read_string(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationErrorKind> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationErrorKind::WrongType(field)),
    }
}

/// Where a catalog document comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    /// The default document shipped with the crate
    Bundled,
    Path(PathBuf),
    Inline(String),
}

/// Validated exercise definitions in document order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exercises: Vec<Arc<ExerciseDefinition>>,
    rejected: Vec<ValidationError>,
}

impl Catalog {
    pub fn load(source: &CatalogSource) -> Result<Self, CatalogError> {
        match source {
            CatalogSource::Bundled => Self::bundled(),
            CatalogSource::Path(path) => Self::from_path(path),
            CatalogSource::Inline(json) => Self::from_json_str(json),
        }
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        let contents = DATA_DIR
            .get_file(BUNDLED_FILE)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| {
                CatalogError::InvalidDocument(format!("bundled {BUNDLED_FILE} is missing"))
            })?;
        Self::from_json_str(contents)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            loaded = catalog.len(),
            rejected = catalog.rejected.len(),
            "loaded exercise catalog"
        );
        Ok(catalog)
    }

    /// Parses a document of the form `{"exercises": {"<id>": {...}}}`.
    ///
    /// Invalid definitions are skipped and reported through [`Catalog::rejected`].
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: Value = serde_json::from_str(json)?;
        let entries = document
            .get("exercises")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                CatalogError::InvalidDocument("missing `exercises` object".to_string())
            })?;

        let mut catalog = Catalog::default();
        for (id, entry) in entries {
            match ExerciseDefinition::from_value(id, entry) {
                Ok(definition) => catalog.exercises.push(Arc::new(definition)),
                Err(err) => {
                    warn!(exercise = %id, error = %err.kind, "rejected exercise definition");
                    catalog.rejected.push(err);
                }
            }
        }
        Ok(catalog)
    }

    /// Replaces the definitions from `source`, keeping the current ones on failure.
    ///
    /// Definitions already handed out stay valid; only later lookups see the new set.
    pub fn reload(&mut self, source: &CatalogSource) -> Result<(), CatalogError> {
        *self = Self::load(source)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Arc<ExerciseDefinition>, CatalogError> {
        self.exercises
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.exercises.iter().any(|e| e.id == id)
    }

    pub fn list(&self) -> &[Arc<ExerciseDefinition>] {
        &self.exercises
    }

    pub fn rejected(&self) -> &[ValidationError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}
