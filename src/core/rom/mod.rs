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

//! ROM image ingestion
//!
//! Normalizes raw cartridge dumps into a validated [`RomImage`] before they are
//! handed to the emulation core. Master System and Game Gear cartridges are
//! built from 16KB banks, so a valid image is a whole number of banks. Dumps
//! made with old cartridge copiers carry an extra 512 byte header which is
//! stripped here.
//!
//! # Example
//!
//! ```
//! use mastersave::core::rom::{ingest, Platform};
//!
//! let rom = ingest(Some(vec![0u8; 32768]), ".gg").unwrap();
//! assert_eq!(rom.platform(), Platform::GameGear);
//! assert_eq!(rom.len(), 32768);
//! ```

mod source;

pub use source::RomSource;

use crate::core::error::RomError;
use serde::Serialize;
use std::io::Read;

/// Size of one cartridge bank in bytes
pub const BANK_SIZE: usize = 16384;

/// Size of the legacy copier header prepended to some dumps
pub const COPIER_HEADER_SIZE: usize = 512;

/// Largest image the Sega mapper can address (256 banks)
///
/// Archive entries declaring more than this plus a copier header are rejected
/// before any data is read.
pub const MAX_ROM_SIZE: usize = 256 * BANK_SIZE;

/// Target console of a ROM image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    /// Sega Master System
    Sms,
    /// Sega Game Gear
    GameGear,
}

impl Platform {
    /// Derive the platform from a file extension
    ///
    /// Only the exact extension `".gg"` selects Game Gear; everything else,
    /// including `".sms"`, is treated as a Master System image. Callers that
    /// accept mixed-case file names lowercase the extension first
    /// (see [`RomSource::extension`]).
    pub fn from_extension(ext: &str) -> Self {
        if ext == ".gg" {
            Platform::GameGear
        } else {
            Platform::Sms
        }
    }
}

/// Validated ROM image ready for the emulation core
///
/// Only constructed through [`ingest`] and [`ingest_reader`], so every value
/// is either a whole number of 16KB banks or the empty placeholder used when
/// the core is started without a cartridge (controller remapping mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    /// Bank-aligned image data (`None` for the placeholder)
    data: Option<Vec<u8>>,
    /// Console the image targets
    platform: Platform,
}

impl RomImage {
    /// Image bytes (empty for the placeholder)
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Console the image targets
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Length of the image in bytes (always a multiple of [`BANK_SIZE`])
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns true for the placeholder image
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this image stands in for a missing cartridge
    pub fn is_placeholder(&self) -> bool {
        self.data.is_none()
    }

    /// Number of 16KB banks in the image
    pub fn bank_count(&self) -> usize {
        self.len() / BANK_SIZE
    }

    /// CRC32 of the image as 8 lowercase hex digits
    ///
    /// This is the key of the per-ROM folder holding save states and cheats.
    ///
    /// # Example
    ///
    /// ```
    /// use mastersave::core::rom::ingest;
    ///
    /// let rom = ingest(Some(vec![0u8; 16384]), ".sms").unwrap();
    /// assert_eq!(rom.checksum().len(), 8);
    /// ```
    pub fn checksum(&self) -> String {
        format!("{:08x}", crc32fast::hash(self.data()))
    }

    /// Consume the image, returning its bytes
    pub fn into_data(self) -> Vec<u8> {
        self.data.unwrap_or_default()
    }
}

/// Validate a raw image and tag it with its platform
///
/// # Arguments
///
/// * `bytes` - Raw image, or `None` to build the no-cartridge placeholder
/// * `ext` - File extension including the dot (`".sms"` or `".gg"`)
///
/// # Returns
///
/// - `Ok(RomImage)` if the size is a whole number of banks, possibly after
///   stripping a 512 byte copier header
/// - `Err(RomError::InvalidRomSize)` otherwise
pub fn ingest(bytes: Option<Vec<u8>>, ext: &str) -> Result<RomImage, RomError> {
    let platform = Platform::from_extension(ext);

    let Some(mut data) = bytes else {
        log::debug!("No ROM data supplied, building placeholder image");
        return Ok(RomImage {
            data: None,
            platform,
        });
    };

    let len = data.len();
    if len < BANK_SIZE || len % BANK_SIZE != 0 {
        if len >= BANK_SIZE && (len - COPIER_HEADER_SIZE) % BANK_SIZE == 0 {
            log::info!("Stripping {} byte copier header", COPIER_HEADER_SIZE);
            data.drain(..COPIER_HEADER_SIZE);
        } else {
            log::error!("ROM is not the correct size: {} bytes", len);
            return Err(RomError::InvalidRomSize { len });
        }
    }

    log::info!(
        "Ingested {:?} ROM: {} banks",
        platform,
        data.len() / BANK_SIZE
    );

    Ok(RomImage {
        data: Some(data),
        platform,
    })
}

/// Materialize an archive entry and validate it
///
/// # Arguments
///
/// * `reader` - Decompressing reader positioned at the start of the entry
/// * `declared_size` - Uncompressed size recorded for the entry, if known
/// * `entry` - Entry name, used for error reporting
/// * `ext` - File extension including the dot
///
/// # Returns
///
/// - `Err(RomError::UnknownEntrySize)` if the entry has no recorded size
/// - `Err(RomError::InvalidRomSize)` if the recorded size exceeds
///   [`MAX_ROM_SIZE`] plus a copier header
/// - `Err(RomError::Io)` if the entry is shorter than declared
/// - Otherwise the result of [`ingest`] on the entry bytes
pub fn ingest_reader<R: Read>(
    reader: R,
    declared_size: Option<u64>,
    entry: &str,
    ext: &str,
) -> Result<RomImage, RomError> {
    let size = declared_size.ok_or_else(|| RomError::UnknownEntrySize {
        entry: entry.to_string(),
    })?;

    let limit = MAX_ROM_SIZE + COPIER_HEADER_SIZE;
    let len = match usize::try_from(size) {
        Ok(len) if len <= limit => len,
        _ => {
            log::error!("Entry '{}' declares {} bytes, too large for a ROM", entry, size);
            return Err(RomError::InvalidRomSize {
                len: usize::try_from(size).unwrap_or(usize::MAX),
            });
        }
    };

    let mut data = Vec::with_capacity(len);
    reader.take(size).read_to_end(&mut data)?;

    if data.len() as u64 != size {
        return Err(RomError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "entry '{}' ended after {} of {} bytes",
                entry,
                data.len(),
                size
            ),
        )));
    }

    ingest(Some(data), ext)
}
