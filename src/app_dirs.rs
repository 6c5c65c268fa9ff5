use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "repcount";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    /// User-editable exercise document that overrides the bundled one
    pub fn user_catalog_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("exercises.json"))
    }

    pub fn event_log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("events.csv"))
        } else {
            Self::project().map(|pd| pd.data_local_dir().join("events.csv"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_expected_file_names() {
        if let Some(path) = AppDirs::config_path() {
            assert!(path.ends_with("config.json"));
        }
        if let Some(path) = AppDirs::user_catalog_path() {
            assert!(path.ends_with("exercises.json"));
        }
        if let Some(path) = AppDirs::event_log_path() {
            assert!(path.ends_with("events.csv"));
        }
    }
}
