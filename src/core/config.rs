// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Front-end options
//!
//! Options are loaded once and passed by reference to whatever needs them.
//! They are stored as TOML; the older `key=value` settings format can still
//! be read with [`Options::parse_legacy`].

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`Options::data_dir`]
pub const ENV_DATA_DIR: &str = "MASTERSAVE_DATA_DIR";

/// Environment variable overriding [`Options::game_genie`] (`1` or `0`)
pub const ENV_GAME_GENIE: &str = "MASTERSAVE_GAME_GENIE";

/// Screen orientation requested from the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
    Sensor,
}

/// Front-end options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Keep the screen in [`Options::orientation`] instead of following the sensor
    pub orientation_lock: bool,
    pub disable_sound: bool,
    pub orientation: Orientation,
    pub larger_buttons: bool,
    /// Hide on-screen buttons (external controller in use)
    pub no_buttons: bool,
    /// Report a Japanese console to the ROM
    pub japanese_mode: bool,
    pub no_stretching: bool,
    /// Folder the ROM browser opens in
    pub default_path: Option<PathBuf>,
    /// Hand enabled cheat codes to the emulation core
    pub game_genie: bool,
    /// Root of the save-state tree
    pub data_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            orientation_lock: false,
            disable_sound: false,
            orientation: Orientation::default(),
            larger_buttons: false,
            no_buttons: false,
            japanese_mode: false,
            no_stretching: false,
            default_path: None,
            game_genie: false,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Options {
    /// Load options from a TOML file
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let options = toml::from_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the older `key=value` settings format
    ///
    /// Unknown keys and lines without `=` are ignored. Flags are true only
    /// for the value `1`; any orientation other than `portrait` reads as
    /// landscape, and an empty `default_path` means none.
    pub fn parse_legacy(text: &str) -> Self {
        let mut options = Self::default();

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            let flag = value == "1";

            match key.trim() {
                "orientation_lock" => options.orientation_lock = flag,
                "disable_sound" => options.disable_sound = flag,
                "larger_buttons" => options.larger_buttons = flag,
                "no_buttons" => options.no_buttons = flag,
                "japanese_mode" => options.japanese_mode = flag,
                "no_stretching" => options.no_stretching = flag,
                "game_genie" => options.game_genie = flag,
                "orientation" => {
                    options.orientation = if value == "portrait" {
                        Orientation::Portrait
                    } else {
                        Orientation::Landscape
                    }
                }
                "default_path" => {
                    options.default_path = (!value.is_empty()).then(|| PathBuf::from(value))
                }
                other => log::warn!("Ignoring unknown setting '{}'", other),
            }
        }

        options
    }

    /// Apply overrides from the process environment
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up through `var`
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            log::debug!("{} overrides data_dir: {}", ENV_DATA_DIR, dir);
            self.data_dir = PathBuf::from(dir);
        }

        match var(ENV_GAME_GENIE).as_deref() {
            Some("1") => self.game_genie = true,
            Some("0") => self.game_genie = false,
            Some(other) => log::warn!("Ignoring {}={}", ENV_GAME_GENIE, other),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let options = Options::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mastersave.toml");

        let options = Options {
            orientation: Orientation::Sensor,
            japanese_mode: true,
            default_path: Some(PathBuf::from("/roms")),
            game_genie: true,
            ..Options::default()
        };
        options.save(&path).unwrap();

        assert_eq!(Options::load(&path).unwrap(), options);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let options: Options = toml::from_str("no_buttons = true\norientation = \"portrait\"\n").unwrap();
        assert!(options.no_buttons);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert_eq!(options.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "orientation = 3").unwrap();

        assert!(matches!(Options::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_legacy() {
        let text = "orientation_lock=1\n\
                    disable_sound=0\n\
                    orientation=portrait\n\
                    larger_buttons=yes\n\
                    default_path=/sdcard/roms\n\
                    game_genie=1\n\
                    mystery=1\n\
                    garbage line\n";
        let options = Options::parse_legacy(text);

        assert!(options.orientation_lock);
        assert!(!options.disable_sound);
        assert!(!options.larger_buttons);
        assert!(options.game_genie);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert_eq!(options.default_path, Some(PathBuf::from("/sdcard/roms")));
    }

    #[test]
    fn test_parse_legacy_defaults() {
        let options = Options::parse_legacy("orientation=sensor\ndefault_path=\n");
        assert_eq!(options.orientation, Orientation::Landscape);
        assert_eq!(options.default_path, None);
    }

    #[test]
    fn test_overrides() {
        let mut options = Options::default();
        options.apply_overrides(|key| match key {
            ENV_DATA_DIR => Some("/tmp/states".to_string()),
            ENV_GAME_GENIE => Some("1".to_string()),
            _ => None,
        });
        assert_eq!(options.data_dir, PathBuf::from("/tmp/states"));
        assert!(options.game_genie);

        options.apply_overrides(|key| (key == ENV_GAME_GENIE).then(|| "0".to_string()));
        assert!(!options.game_genie);
        assert_eq!(options.data_dir, PathBuf::from("/tmp/states"));
    }
}
