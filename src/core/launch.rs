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

//! Hand-off to the emulation core
//!
//! Everything the core needs to boot a cartridge is gathered into one
//! [`LaunchBundle`] value and passed explicitly.

use crate::core::cheats::{CheatList, PackedCheat};
use crate::core::config::Options;
use crate::core::error::Result;
use crate::core::rom::{RomImage, RomSource};

/// Validated ROM plus the cheat words to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchBundle {
    pub rom: RomImage,
    /// Checksum of the ROM, computed only when cheats are enabled
    pub checksum: Option<String>,
    /// Packed enabled cheats in list order
    pub cheats: Vec<PackedCheat>,
}

impl LaunchBundle {
    /// Ingest a ROM and, if cheats are enabled, load and pack its codes
    ///
    /// # Returns
    ///
    /// - `Ok(LaunchBundle)` ready for the core
    /// - `Err(MasterError::Rom)` if the ROM cannot be loaded or validated
    /// - `Err(MasterError::Cheat)` if the stored cheat list is corrupt
    pub fn prepare(options: &Options, source: &RomSource) -> Result<Self> {
        let rom = source.load()?;
        log::info!(
            "Prepared {} ({:?}, {} banks)",
            source.name(),
            rom.platform(),
            rom.bank_count()
        );

        if !options.game_genie {
            return Ok(Self {
                rom,
                checksum: None,
                cheats: Vec::new(),
            });
        }

        let checksum = rom.checksum();
        let cheats = CheatList::load(&options.data_dir, &checksum)?.packed_enabled()?;
        log::info!("Applying {} cheats for {}", cheats.len(), checksum);

        Ok(Self {
            rom,
            checksum: Some(checksum),
            cheats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cheats::{CheatCode, CodeKind};
    use crate::core::error::MasterError;
    use crate::core::rom::Platform;
    use tempfile::TempDir;

    fn write_rom(dir: &TempDir, name: &str, len: usize) -> RomSource {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![0x5Au8; len]).unwrap();
        RomSource::Filesystem(path)
    }

    #[test]
    fn test_prepare_without_cheats() {
        let dir = TempDir::new().unwrap();
        let source = write_rom(&dir, "game.gg", 32768);

        let bundle = LaunchBundle::prepare(&Options::default(), &source).unwrap();
        assert_eq!(bundle.rom.platform(), Platform::GameGear);
        assert_eq!(bundle.checksum, None);
        assert!(bundle.cheats.is_empty());
    }

    #[test]
    fn test_prepare_with_cheats() {
        let dir = TempDir::new().unwrap();
        let source = write_rom(&dir, "game.sms", 16384 + 512);
        let options = Options {
            game_genie: true,
            data_dir: dir.path().join("data"),
            ..Options::default()
        };

        let checksum = source.load().unwrap().checksum();
        let mut list = CheatList::new();
        let mut enabled = CheatCode::new(CodeKind::ActionReplay, "Lives", "00C0-0A05").unwrap();
        enabled.set_enabled(true);
        list.add(enabled);
        list.add(CheatCode::new(CodeKind::GameGenie, "Jump", "ABC-123").unwrap());
        list.save(&options.data_dir, &checksum).unwrap();

        let bundle = LaunchBundle::prepare(&options, &source).unwrap();
        assert_eq!(bundle.rom.len(), 16384);
        assert_eq!(bundle.checksum.as_deref(), Some(checksum.as_str()));
        assert_eq!(bundle.cheats.len(), 1);
        assert_eq!(bundle.cheats[0].kind(), Some(CodeKind::ActionReplay));
    }

    #[test]
    fn test_prepare_invalid_rom() {
        let dir = TempDir::new().unwrap();
        let source = write_rom(&dir, "bad.sms", 1000);

        let result = LaunchBundle::prepare(&Options::default(), &source);
        assert!(matches!(result, Err(MasterError::Rom(_))));
    }

    #[test]
    fn test_prepare_corrupt_cheat_list() {
        let dir = TempDir::new().unwrap();
        let source = write_rom(&dir, "game.sms", 16384);
        let options = Options {
            game_genie: true,
            data_dir: dir.path().join("data"),
            ..Options::default()
        };

        let checksum = source.load().unwrap().checksum();
        let path = CheatList::path(&options.data_dir, &checksum);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "AR:broken\n").unwrap();

        let result = LaunchBundle::prepare(&options, &source);
        assert!(matches!(result, Err(MasterError::Cheat(_))));
    }
}
