use crate::angle::DEFAULT_MIN_CONFIDENCE;
use crate::app_dirs::AppDirs;
use crate::catalog::CatalogSource;
use crate::milestone::DEFAULT_MILESTONE_INTERVAL;
use crate::resequence::DEFAULT_MAX_PENDING;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_exercise: String,
    pub min_confidence: f64,
    pub milestone_interval: u32,
    pub max_pending_frames: usize,
    /// Exercise document to load instead of the bundled one
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_exercise: "overhead_press".to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            max_pending_frames: DEFAULT_MAX_PENDING,
            catalog_path: None,
        }
    }
}

impl Config {
    /// Explicit path, then the user's catalog in the config dir, then the bundled one
    pub fn catalog_source(&self) -> CatalogSource {
        if let Some(path) = &self.catalog_path {
            return CatalogSource::Path(path.clone());
        }
        match AppDirs::user_catalog_path() {
            Some(path) if path.exists() => CatalogSource::Path(path),
            _ => CatalogSource::Bundled,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        let min_confidence = if cfg.min_confidence.is_finite() {
            cfg.min_confidence.clamp(0.0, 1.0)
        } else {
            warn!(value = cfg.min_confidence, "ignoring non-finite min_confidence");
            DEFAULT_MIN_CONFIDENCE
        };
        Self {
            min_confidence,
            milestone_interval: cfg.milestone_interval,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("repcount_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, writing the defaults out first when no file exists yet
    pub fn load_or_create(&self) -> Config {
        if self.path.exists() {
            return self.load();
        }
        let cfg = Config::default();
        match self.save(&cfg) {
            Ok(()) => info!(path = %self.path.display(), "wrote default config"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not write default config");
            }
        }
        cfg
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            default_exercise: "squat".into(),
            min_confidence: 0.65,
            milestone_interval: 25,
            max_pending_frames: 3,
            catalog_path: Some(PathBuf::from("/tmp/exercises.json")),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"milestone_interval": 5}"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.milestone_interval, 5);
        assert_eq!(loaded.default_exercise, "overhead_press");
        assert_eq!(loaded.min_confidence, DEFAULT_MIN_CONFIDENCE);
    }

    #[test]
    fn corrupt_or_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
        fs::write(&path, "{ nope").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh").join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load_or_create(), Config::default());
        assert!(path.exists());

        fs::write(&path, r#"{"default_exercise": "squat"}"#).unwrap();
        assert_eq!(store.load_or_create().default_exercise, "squat");
    }

    #[test]
    fn non_finite_confidence_falls_back_to_default() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let cfg = Config {
                min_confidence: value,
                ..Config::default()
            };
            assert_eq!(SessionConfig::from(&cfg).min_confidence, DEFAULT_MIN_CONFIDENCE);
        }
    }

    #[test]
    fn explicit_catalog_path_wins() {
        let cfg = Config {
            catalog_path: Some(PathBuf::from("/srv/exercises.json")),
            ..Config::default()
        };
        assert_eq!(
            cfg.catalog_source(),
            CatalogSource::Path(PathBuf::from("/srv/exercises.json"))
        );
    }

    #[test]
    fn session_config_clamps_confidence() {
        let cfg = Config {
            min_confidence: 1.7,
            milestone_interval: 0,
            ..Config::default()
        };
        let session = SessionConfig::from(&cfg);
        assert_eq!(session.min_confidence, 1.0);
        assert_eq!(session.milestone_interval, 0);
    }
}
