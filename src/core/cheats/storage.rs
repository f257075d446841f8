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

//! Per-ROM cheat list persistence
//!
//! Each ROM's codes live in `<data_dir>/<checksum>/listof.codes`, one
//! storage line per code.

use super::{pack_enabled, CheatCode, PackedCheat};
use crate::core::error::CheatError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the cheat list inside a ROM folder
pub const CODES_FILE_NAME: &str = "listof.codes";

/// Ordered list of cheat codes for one ROM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheatList {
    codes: Vec<CheatCode>,
}

impl CheatList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the cheat list file for a ROM checksum
    pub fn path(data_dir: &Path, checksum: &str) -> PathBuf {
        data_dir.join(checksum).join(CODES_FILE_NAME)
    }

    /// Load the cheat list of a ROM
    ///
    /// Creates the ROM folder if it does not exist. A missing list file
    /// yields an empty list.
    ///
    /// # Returns
    ///
    /// - `Ok(CheatList)` on success
    /// - `Err(CheatError::CorruptStorageLine)` if a stored line is malformed
    /// - `Err(CheatError::Io)` if the folder or file cannot be accessed
    pub fn load(data_dir: &Path, checksum: &str) -> Result<Self, CheatError> {
        std::fs::create_dir_all(data_dir.join(checksum))?;

        let path = Self::path(data_dir, checksum);
        if !path.exists() {
            log::debug!("No cheat list at {}", path.display());
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(&path)?;
        let list = Self::parse(&contents)?;
        log::info!("Loaded {} codes for {}", list.len(), checksum);
        Ok(list)
    }

    /// Parse the contents of a list file
    ///
    /// Lines without any `:` (blank lines included) are skipped.
    pub fn parse(contents: &str) -> Result<Self, CheatError> {
        let codes = contents
            .lines()
            .filter(|line| line.contains(':'))
            .map(CheatCode::from_storage_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { codes })
    }

    /// Save the cheat list of a ROM, replacing any previous file
    pub fn save(&self, data_dir: &Path, checksum: &str) -> Result<(), CheatError> {
        std::fs::create_dir_all(data_dir.join(checksum))?;

        let path = Self::path(data_dir, checksum);
        let mut writer = BufWriter::new(File::create(&path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;

        log::info!("Saved {} codes for {}", self.len(), checksum);
        Ok(())
    }

    /// Write every code as a storage line followed by `\n`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), CheatError> {
        for code in &self.codes {
            writeln!(writer, "{}", code.to_storage_line())?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CheatCode> {
        self.codes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CheatCode> {
        self.codes.iter()
    }

    /// Append a code
    pub fn add(&mut self, code: CheatCode) {
        self.codes.push(code);
    }

    /// Replace the code at `index` (edit in place)
    pub fn replace(&mut self, index: usize, code: CheatCode) -> Result<(), CheatError> {
        let slot = self
            .codes
            .get_mut(index)
            .ok_or(CheatError::NoSuchCode { index })?;
        *slot = code;
        Ok(())
    }

    /// Remove and return the code at `index`
    pub fn remove(&mut self, index: usize) -> Result<CheatCode, CheatError> {
        if index >= self.codes.len() {
            return Err(CheatError::NoSuchCode { index });
        }
        Ok(self.codes.remove(index))
    }

    /// Toggle the code at `index`, returning its new state
    pub fn toggle(&mut self, index: usize) -> Result<bool, CheatError> {
        self.codes
            .get_mut(index)
            .map(CheatCode::toggle)
            .ok_or(CheatError::NoSuchCode { index })
    }

    /// Packed words of the enabled codes, in list order
    pub fn packed_enabled(&self) -> Result<Vec<PackedCheat>, CheatError> {
        pack_enabled(&self.codes)
    }
}

impl<'a> IntoIterator for &'a CheatList {
    type Item = &'a CheatCode;
    type IntoIter = std::slice::Iter<'a, CheatCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.codes.iter()
    }
}
