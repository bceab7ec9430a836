use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Measurement parameters the operator rarely changes: the physical height
/// of the calibration ruler and the optional camera model. A field-of-view
/// or image width of zero keeps the estimator in linear mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureConfig {
    #[serde(default = "default_ruler_height_cm")]
    pub ruler_height_cm: f64,
    #[serde(default)]
    pub fov_degrees: f64,
    #[serde(default)]
    pub image_width_px: f64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            ruler_height_cm: default_ruler_height_cm(),
            fov_degrees: 0.0,
            image_width_px: 0.0,
        }
    }
}

fn default_ruler_height_cm() -> f64 {
    12.0
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub measure: MeasureConfig,
}

impl Settings {
    /// Loads settings from disk; an absent file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppPaths {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub settings_path: PathBuf,
}

impl AppPaths {
    /// Resolves the per-user data directory and makes sure it exists.
    pub fn discover() -> Result<Self> {
        let data_root = dirs::data_dir()
            .ok_or_else(|| Error::Path("Failed to get user data dir".to_string()))?;
        Self::rooted_at(data_root.join("SedimentLedger"))
    }

    /// Same layout under an explicit root, for tests and the CLI's
    /// `--data-dir` style overrides.
    pub fn rooted_at(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            db_path: root.join("ledger.db"),
            settings_path: root.join("settings.json"),
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_linear_mode() {
        let settings = Settings::default();
        assert_eq!(settings.measure.ruler_height_cm, 12.0);
        assert_eq!(settings.measure.fov_degrees, 0.0);
        assert_eq!(settings.measure.image_width_px, 0.0);
    }

    #[test]
    fn missing_settings_file_loads_defaults() {
        let path = std::env::temp_dir().join("sl_settings_missing.json");
        let _ = std::fs::remove_file(&path);
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.measure.ruler_height_cm, 12.0);
    }

    #[test]
    fn settings_roundtrip() {
        let path = std::env::temp_dir().join("sl_settings_roundtrip.json");
        let mut settings = Settings::default();
        settings.measure.fov_degrees = 68.0;
        settings.measure.image_width_px = 4032.0;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.measure.fov_degrees, 68.0);
        assert_eq!(loaded.measure.image_width_px, 4032.0);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let path = std::env::temp_dir().join("sl_settings_partial.json");
        std::fs::write(&path, r#"{"measure": {"fov_degrees": 45.0}}"#).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.measure.fov_degrees, 45.0);
        assert_eq!(loaded.measure.ruler_height_cm, 12.0);
    }

    #[test]
    fn rooted_paths_share_the_root() {
        let root = std::env::temp_dir().join("sl_paths_root");
        let paths = AppPaths::rooted_at(root.clone()).unwrap();
        assert_eq!(paths.db_path, root.join("ledger.db"));
        assert_eq!(paths.settings_path, root.join("settings.json"));
        assert!(root.is_dir());
    }
}
