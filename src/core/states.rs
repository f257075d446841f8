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

//! Save-state folders
//!
//! The emulation core writes `.mesav` files into `<data_dir>/<checksum>/`.
//! This module lists and deletes them and generates their file names.

use chrono::NaiveDateTime;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of save-state files
pub const STATE_EXTENSION: &str = ".mesav";

/// Auto-save slot written by the core on exit; never listed for loading
pub const CURRENT_STATE_FILE: &str = "current_state.mesav";

/// Save states of one ROM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStates {
    dir: PathBuf,
}

impl SaveStates {
    /// Save states of the ROM with the given checksum
    pub fn new(data_dir: &Path, checksum: &str) -> Self {
        Self {
            dir: data_dir.join(checksum),
        }
    }

    /// Folder holding the states
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List loadable save states, sorted by name
    ///
    /// Matches `.mesav` case-insensitively and skips the auto-save slot.
    /// A missing folder lists as empty.
    pub fn list(&self) -> io::Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut states = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.ends_with(STATE_EXTENSION) && name != CURRENT_STATE_FILE {
                states.push(entry.path());
            }
        }
        states.sort();
        Ok(states)
    }

    /// Delete one save state by file name
    pub fn delete(&self, name: &str) -> io::Result<()> {
        let plain_name = Path::new(name).file_name().map(|n| n == name).unwrap_or(false);
        if !plain_name || !name.to_lowercase().ends_with(STATE_EXTENSION) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a save state name", name),
            ));
        }

        std::fs::remove_file(self.dir.join(name))?;
        log::info!("Deleted save state {}", name);
        Ok(())
    }
}

/// File name for a new save state, e.g. `2024-03-09_07-05-01.mesav`
pub fn timestamped_name(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d_%H-%M-%S.mesav").to_string()
}

/// File name for a new backup archive, e.g. `StateExport_2024-03-09_07-05-01.zip`
pub fn backup_file_name(now: NaiveDateTime) -> String {
    now.format("StateExport_%Y-%m-%d_%H-%M-%S.zip").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap()
    }

    #[test]
    fn test_timestamped_names_are_zero_padded() {
        assert_eq!(timestamped_name(sample_time()), "2024-03-09_07-05-01.mesav");
        assert_eq!(
            backup_file_name(sample_time()),
            "StateExport_2024-03-09_07-05-01.zip"
        );
    }

    #[test]
    fn test_list_skips_current_state() {
        let dir = TempDir::new().unwrap();
        let states = SaveStates::new(dir.path(), "1a2b3c4d");
        std::fs::create_dir_all(states.dir()).unwrap();
        for name in ["b.mesav", "A.MESAV", "current_state.mesav", "listof.codes"] {
            std::fs::write(states.dir().join(name), b"x").unwrap();
        }

        let names: Vec<String> = states
            .list()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.MESAV", "b.mesav"]);
    }

    #[test]
    fn test_list_missing_folder() {
        let dir = TempDir::new().unwrap();
        let states = SaveStates::new(dir.path(), "00000000");
        assert!(states.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let states = SaveStates::new(dir.path(), "1a2b3c4d");
        std::fs::create_dir_all(states.dir()).unwrap();
        std::fs::write(states.dir().join("one.mesav"), b"x").unwrap();

        states.delete("one.mesav").unwrap();
        assert!(states.list().unwrap().is_empty());

        assert!(states.delete("one.mesav").is_err());
        assert!(states.delete("../escape.mesav").is_err());
        assert!(states.delete("listof.codes").is_err());
    }
}
