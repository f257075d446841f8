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

//! Browsable ROM locations
//!
//! A ROM can live directly on disk or inside a `.zip` container. Both are
//! represented by [`RomSource`] so the ROM picker can list, sort and load
//! them uniformly.

use super::{ingest, ingest_reader, RomImage};
use crate::core::error::RomError;
use std::cmp::Ordering;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

const ROM_EXTENSIONS: [&str; 2] = [".sms", ".gg"];
const ARCHIVE_EXTENSION: &str = ".zip";

/// A place a ROM image can be loaded from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RomSource {
    /// Plain file or directory on disk
    Filesystem(PathBuf),
    /// Entry inside a zip archive
    ArchiveEntry {
        /// Path of the containing archive
        archive: PathBuf,
        /// Full entry name inside the archive
        entry: String,
    },
}

impl RomSource {
    /// List a directory for the ROM picker
    ///
    /// Returns non-hidden subdirectories plus `.sms`, `.gg` and `.zip` files
    /// (extension match is case-insensitive): directories first, then files,
    /// each sorted by path.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory to list
    /// * `filter` - Optional case-insensitive substring the file name must contain;
    ///   directories are always listed
    pub fn list_dir(dir: &Path, filter: Option<&str>) -> Result<Vec<RomSource>, RomError> {
        let needle = normalize_filter(filter);
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_lowercase();

            if path.is_dir() {
                if !name.starts_with('.') {
                    dirs.push(RomSource::Filesystem(path));
                }
                continue;
            }

            let listable = ROM_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
                || name.ends_with(ARCHIVE_EXTENSION);
            if listable && matches_filter(&name, needle.as_deref()) {
                files.push(RomSource::Filesystem(path));
            }
        }

        dirs.sort();
        files.sort();
        dirs.append(&mut files);
        log::debug!("Listed {} entries in {}", dirs.len(), dir.display());
        Ok(dirs)
    }

    /// List the ROM entries of a zip archive
    ///
    /// Directory entries are skipped; file entries are kept when their
    /// lowercased name ends in `.sms` or `.gg`. The filter is matched against
    /// the last path component of the entry name.
    pub fn list_archive(archive: &Path, filter: Option<&str>) -> Result<Vec<RomSource>, RomError> {
        let needle = normalize_filter(filter);
        let mut zip = ZipArchive::new(File::open(archive)?)?;
        let mut sources = Vec::new();

        for i in 0..zip.len() {
            let file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_lowercase();
            let base_name = name.rsplit('/').next().unwrap_or(name.as_str());
            if ROM_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
                && matches_filter(base_name, needle.as_deref())
            {
                sources.push(RomSource::ArchiveEntry {
                    archive: archive.to_path_buf(),
                    entry: file.name().to_string(),
                });
            }
        }

        sources.sort();
        Ok(sources)
    }

    /// List whatever this source contains
    ///
    /// Directories list like [`RomSource::list_dir`], `.zip` files like
    /// [`RomSource::list_archive`]. ROM files and archive entries have no
    /// children.
    pub fn children(&self, filter: Option<&str>) -> Result<Vec<RomSource>, RomError> {
        match self {
            RomSource::Filesystem(path) if path.is_dir() => Self::list_dir(path, filter),
            RomSource::Filesystem(path) if self.is_archive() => Self::list_archive(path, filter),
            _ => Ok(Vec::new()),
        }
    }

    /// Returns true for directories and `.zip` files
    pub fn is_container(&self) -> bool {
        match self {
            RomSource::Filesystem(path) => path.is_dir() || self.is_archive(),
            RomSource::ArchiveEntry { .. } => false,
        }
    }

    fn is_archive(&self) -> bool {
        matches!(self, RomSource::Filesystem(_)) && self.extension() == ARCHIVE_EXTENSION
    }

    /// Display name (file name or last component of the entry name)
    pub fn name(&self) -> String {
        match self {
            RomSource::Filesystem(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            RomSource::ArchiveEntry { entry, .. } => {
                entry.rsplit('/').next().unwrap_or(entry.as_str()).to_string()
            }
        }
    }

    /// Lowercase extension including the dot, or an empty string
    pub fn extension(&self) -> String {
        let name = self.name().to_lowercase();
        match name.rfind('.') {
            Some(pos) => name[pos..].to_string(),
            None => String::new(),
        }
    }

    /// Read the ROM bytes and validate them
    ///
    /// # Returns
    ///
    /// - `Ok(RomImage)` for a correctly sized image
    /// - `Err(RomError::NotARom)` if the source is a directory or archive
    /// - `Err(RomError::EntryNotFound)` if the archive no longer holds the entry
    /// - Any ingestion or I/O error
    pub fn load(&self) -> Result<RomImage, RomError> {
        let ext = self.extension();

        match self {
            RomSource::Filesystem(path) => {
                if self.is_container() {
                    return Err(RomError::NotARom { path: path.clone() });
                }
                log::info!("Loading ROM from {}", path.display());
                let data = std::fs::read(path)?;
                ingest(Some(data), &ext)
            }
            RomSource::ArchiveEntry { archive, entry } => {
                log::info!("Loading ROM '{}' from {}", entry, archive.display());
                let mut zip = ZipArchive::new(File::open(archive)?)?;
                let file = match zip.by_name(entry) {
                    Ok(file) => file,
                    Err(ZipError::FileNotFound) => {
                        return Err(RomError::EntryNotFound {
                            archive: archive.clone(),
                            entry: entry.clone(),
                        })
                    }
                    Err(e) => return Err(e.into()),
                };
                let size = Some(file.size());
                ingest_reader(file, size, entry, &ext)
            }
        }
    }
}

/// Filesystem sources first, then archive entries; each by path (and entry name)
///
/// Directory-first ordering is applied by [`RomSource::list_dir`], which knows
/// which paths are directories when it lists them.
impl Ord for RomSource {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RomSource::Filesystem(a), RomSource::Filesystem(b)) => a.cmp(b),
            (RomSource::Filesystem(_), RomSource::ArchiveEntry { .. }) => Ordering::Less,
            (RomSource::ArchiveEntry { .. }, RomSource::Filesystem(_)) => Ordering::Greater,
            (
                RomSource::ArchiveEntry { archive, entry },
                RomSource::ArchiveEntry {
                    archive: other_archive,
                    entry: other_entry,
                },
            ) => (archive, entry).cmp(&(other_archive, other_entry)),
        }
    }
}

impl PartialOrd for RomSource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn normalize_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
}

fn matches_filter(name: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| name.contains(needle))
}
