//! Boot configuration.

use marigold_core::{ReadSource, SourceError};
use serde::Deserialize;
use thiserror::Error;

/// The document [`Settings::load`] reads from the asset source.
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application settings, deserialized from [`SETTINGS_FILE`].
///
/// Every field has a default, so a sparse document still boots. Unknown
/// keys are ignored, which keeps old settings files loadable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,
    pub window_full_screen: bool,
    /// Name of the world loaded when the game starts.
    pub welcome_world: String,
    pub max_frame_rate: f32,
    /// Directory the asset source is rooted at.
    pub resources_root: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
            window_title: "Marigold".to_owned(),
            window_full_screen: false,
            welcome_world: "main".to_owned(),
            max_frame_rate: 60.0,
            resources_root: "resources".to_owned(),
        }
    }
}

impl Settings {
    /// Reads settings from `source`. A missing document falls back to
    /// the defaults; a present but malformed one is an error.
    pub fn load(source: &dyn ReadSource) -> Result<Self, SettingsError> {
        match source.read(SETTINGS_FILE) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(SourceError::NotFound(_)) => {
                log::info!("no {SETTINGS_FILE}, using default settings");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use marigold_core::MemorySource;
    use serde_json::json;

    use super::*;

    #[test]
    fn a_missing_document_yields_defaults() {
        let settings = Settings::load(&MemorySource::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn a_sparse_document_keeps_the_other_defaults() {
        let source = MemorySource::new().with(
            SETTINGS_FILE,
            json!({"window-width": 640, "welcome-world": "menu"}).to_string(),
        );
        let settings = Settings::load(&source).unwrap();
        assert_eq!(settings.window_width, 640);
        assert_eq!(settings.welcome_world, "menu");
        assert_eq!(settings.window_height, 768);
        assert_eq!(settings.max_frame_rate, 60.0);
    }

    #[test]
    fn kebab_case_keys_map_onto_every_field() {
        let source = MemorySource::new().with(
            SETTINGS_FILE,
            json!({
                "window-width": 800,
                "window-height": 600,
                "window-title": "Demo",
                "window-full-screen": true,
                "welcome-world": "intro",
                "max-frame-rate": 120.0,
                "resources-root": "assets"
            })
            .to_string(),
        );
        let settings = Settings::load(&source).unwrap();
        assert_eq!(settings.window_height, 600);
        assert_eq!(settings.window_title, "Demo");
        assert!(settings.window_full_screen);
        assert_eq!(settings.max_frame_rate, 120.0);
        assert_eq!(settings.resources_root, "assets");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let source = MemorySource::new().with(
            SETTINGS_FILE,
            json!({"window-icon": "icon.png", "window-width": 320}).to_string(),
        );
        let settings = Settings::load(&source).unwrap();
        assert_eq!(settings.window_width, 320);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let source = MemorySource::new().with(SETTINGS_FILE, "{not json");
        assert!(matches!(
            Settings::load(&source),
            Err(SettingsError::Parse(_))
        ));
    }
}
