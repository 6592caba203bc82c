//! Game configuration loaded from a RON file next to the executable.
//!
//! Every field has a default so a partial file still loads; a missing
//! or malformed file falls back to [`GameConfig::default`] with a log
//! line instead of an error.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_title: String,
    pub window_width: i32,
    pub window_height: i32,
    pub ticks_per_second: u32,
    /// Search directories seeded into the core asset manager, in
    /// lookup order.
    pub asset_roots: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Ember".to_string(),
            window_width: 1000,
            window_height: 800,
            ticks_per_second: 20,
            asset_roots: vec!["assets/".to_string()],
        }
    }
}

impl GameConfig {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn round_trips_through_ron() {
        let config = GameConfig {
            window_title: "Test".to_string(),
            window_width: 640,
            window_height: 480,
            ticks_per_second: 30,
            asset_roots: vec!["data/".to_string(), "mods/".to_string()],
        };
        let text = ron::to_string(&config).unwrap();
        let back: GameConfig = ron::from_str(&text).unwrap();
        assert_eq!(back.window_title, "Test");
        assert_eq!(back.window_width, 640);
        assert_eq!(back.ticks_per_second, 30);
        assert_eq!(back.asset_roots.len(), 2);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = GameConfig::load_or_default("does/not/exist.ron");
        assert_eq!(config.window_title, "Ember");
        assert_eq!(config.ticks_per_second, 20);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"(window_title: 12").unwrap();
        let config = GameConfig::load_or_default(file.path());
        assert_eq!(config.window_width, 1000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"(ticks_per_second: 60)").unwrap();
        let config = GameConfig::load_or_default(file.path());
        assert_eq!(config.ticks_per_second, 60);
        assert_eq!(config.window_title, "Ember");
    }
}
