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

//! Save-state backup archives
//!
//! Exports the save-state tree (one folder per ROM checksum holding `.mesav`
//! states and `.codes` cheat lists) into a single zip archive and restores it
//! again.
//!
//! # Archive layout
//!
//! | Entry                     | Contents                         |
//! |---------------------------|----------------------------------|
//! | `backup_header`           | 11 byte magic `CM02_BACKUP`      |
//! | `<checksum>/`             | directory marker                 |
//! | `<checksum>/<name>.mesav` | save state                       |
//! | `<checksum>/<name>.codes` | cheat list                       |
//!
//! # Atomicity
//!
//! Neither export nor import is transactional. When an operation fails
//! partway, entries already written to the archive (or files already restored
//! to disk) are left in place. Callers that need all-or-nothing behaviour
//! should export to a temporary file, or import into a scratch directory
//! first.
//!
//! # Example
//!
//! ```no_run
//! use mastersave::core::backup;
//! use std::path::Path;
//!
//! let bytes = backup::export_to_vec(Path::new("data")).unwrap();
//! backup::import_bytes(Path::new("restored"), &bytes).unwrap();
//! ```


use crate::core::error::BackupError;
use serde::Serialize;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Magic payload of the header entry
pub const BACKUP_MAGIC: [u8; 11] = [
    0x43, 0x4D, 0x30, 0x32, 0x5F, 0x42, 0x41, 0x43, 0x4B, 0x55, 0x50,
];

/// Name of the header entry, always first in the archive
pub const HEADER_ENTRY: &str = "backup_header";

/// Length of a save-state folder name (CRC32 as hex)
pub const STATE_DIR_NAME_LEN: usize = 8;

/// Extensions of the files included in a backup
pub const STATE_FILE_EXTENSIONS: [&str; 2] = [".mesav", ".codes"];

const CENTRAL_DIRECTORY: &str = "<central directory>";

/// Counts of what an export, import or delete touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    /// Save-state folders written, restored or removed
    pub directories: usize,
    /// Files written or restored
    pub files: usize,
}

/// Returns true if `name` is a save-state folder name
pub fn is_state_dir_name(name: &str) -> bool {
    name.chars().count() == STATE_DIR_NAME_LEN
}

/// Returns true if `name` is a file that belongs in a backup
pub fn is_state_file_name(name: &str) -> bool {
    STATE_FILE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// List the save-state folders directly under `base_dir`, sorted by name
pub fn state_dirs(base_dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(base_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_dir() && is_state_dir_name(&name.to_string_lossy()) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// List the backup-eligible files inside one save-state folder, sorted by name
fn state_files(dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && is_state_file_name(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
}

fn write_failure(entry: &str) -> impl FnOnce(ZipError) -> BackupError + '_ {
    move |source| BackupError::ArchiveEntryWriteFailure {
        entry: entry.to_string(),
        source,
    }
}

fn read_failure(entry: &str) -> impl FnOnce(ZipError) -> BackupError + '_ {
    move |source| BackupError::ArchiveEntryReadFailure {
        entry: entry.to_string(),
        source,
    }
}

/// Export the save-state tree into a zip archive
///
/// Writes the header entry, then for each save-state folder a directory
/// entry followed by one entry per `.mesav`/`.codes` file. The first failure
/// aborts the export; the archive writer is dropped (and thereby closed) on
/// every exit path.
///
/// # Arguments
///
/// * `base_dir` - Root of the save-state tree
/// * `writer` - Destination of the archive
///
/// # Returns
///
/// The destination writer and a summary of what was written
pub fn export<W: Write + Seek>(
    base_dir: &Path,
    writer: W,
) -> Result<(W, BackupSummary), BackupError> {
    let mut zip = ZipWriter::new(writer);
    let mut summary = BackupSummary::default();

    zip.start_file(HEADER_ENTRY, entry_options())
        .map_err(write_failure(HEADER_ENTRY))?;
    zip.write_all(&BACKUP_MAGIC)
        .map_err(|e| write_failure(HEADER_ENTRY)(ZipError::Io(e)))?;
    log::debug!("Wrote backup header");

    for dir in state_dirs(base_dir)? {
        let dir_name = file_name(&dir);
        let dir_entry = format!("{}/", dir_name);
        zip.add_directory(dir_entry.as_str(), entry_options())
            .map_err(write_failure(&dir_entry))?;
        summary.directories += 1;

        for file in state_files(&dir)? {
            let entry = format!("{}/{}", dir_name, file_name(&file));
            let data = std::fs::read(&file)?;

            zip.start_file(entry.as_str(), entry_options())
                .map_err(write_failure(&entry))?;
            zip.write_all(&data)
                .map_err(|e| write_failure(&entry)(ZipError::Io(e)))?;
            log::debug!("Exported {} ({} bytes)", entry, data.len());
            summary.files += 1;
        }
    }

    let writer = zip.finish().map_err(write_failure(CENTRAL_DIRECTORY))?;
    log::info!(
        "Exported {} save-state folders, {} files",
        summary.directories,
        summary.files
    );
    Ok((writer, summary))
}

/// Export the save-state tree into an in-memory archive
pub fn export_to_vec(base_dir: &Path) -> Result<Vec<u8>, BackupError> {
    let (cursor, _) = export(base_dir, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Export the save-state tree into a new archive file
///
/// A failed export leaves a partial archive at `path`.
pub fn export_to_file(base_dir: &Path, path: &Path) -> Result<BackupSummary, BackupError> {
    let file = File::create(path)?;
    let (mut file, summary) = export(base_dir, file)?;
    file.flush()?;
    Ok(summary)
}

/// Check that the first entry is the backup header
fn verify_header<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<(), BackupError> {
    if zip.len() == 0 {
        return Err(BackupError::BadHeader {
            reason: "archive has no entries".to_string(),
        });
    }

    let mut entry = zip.by_index(0).map_err(read_failure(HEADER_ENTRY))?;
    if entry.name() != HEADER_ENTRY {
        return Err(BackupError::BadHeader {
            reason: format!("first entry is '{}'", entry.name()),
        });
    }

    let mut payload = Vec::with_capacity(BACKUP_MAGIC.len());
    entry
        .read_to_end(&mut payload)
        .map_err(|e| read_failure(HEADER_ENTRY)(ZipError::Io(e)))?;
    if payload != BACKUP_MAGIC {
        return Err(BackupError::BadHeader {
            reason: "magic mismatch".to_string(),
        });
    }

    Ok(())
}

/// Restore a backup archive into the save-state tree
///
/// The header is verified before anything touches `base_dir`. Remaining
/// entries are then processed once each, in archive order: directory entries
/// are created if missing, file entries replace any existing file (missing
/// parent folders are created on demand). The first failure aborts the import
/// and leaves everything restored so far in place.
///
/// # Returns
///
/// - `Ok(BackupSummary)` on success
/// - `Err(BackupError::BadHeader)` if the archive is not a backup
/// - `Err(BackupError::UnsafeEntryPath)` for entries escaping `base_dir`
/// - Read or I/O errors otherwise
pub fn import<R: Read + Seek>(base_dir: &Path, reader: R) -> Result<BackupSummary, BackupError> {
    let mut zip = ZipArchive::new(reader).map_err(|e| match e {
        ZipError::Io(io) => BackupError::Io(io),
        other => BackupError::BadHeader {
            reason: format!("not a zip archive ({})", other),
        },
    })?;

    verify_header(&mut zip)?;
    log::debug!("Backup header verified");

    let mut summary = BackupSummary::default();
    for index in 1..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| read_failure(&format!("#{}", index))(e))?;
        let name = entry.name().to_string();
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| BackupError::UnsafeEntryPath {
                entry: name.clone(),
            })?;
        let target = base_dir.join(relative);

        if entry.is_dir() {
            if !target.exists() {
                std::fs::create_dir_all(&target)?;
            }
            summary.directories += 1;
            continue;
        }

        // The declared size is untrusted; the reader stops at the real end of data
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| read_failure(&name)(ZipError::Io(e)))?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if target.exists() {
            std::fs::remove_file(&target)?;
        }
        std::fs::write(&target, &data)?;
        log::debug!("Restored {} ({} bytes)", name, data.len());
        summary.files += 1;
    }

    log::info!(
        "Imported {} save-state folders, {} files",
        summary.directories,
        summary.files
    );
    Ok(summary)
}

/// Restore a backup held in memory
pub fn import_bytes(base_dir: &Path, archive: &[u8]) -> Result<BackupSummary, BackupError> {
    import(base_dir, Cursor::new(archive))
}

/// Restore a backup archive file
pub fn import_file(base_dir: &Path, path: &Path) -> Result<BackupSummary, BackupError> {
    import(base_dir, File::open(path)?)
}

/// Delete every save-state folder under `base_dir`
///
/// Folders whose names are not 8 characters long, and plain files, are left
/// alone.
pub fn delete_all(base_dir: &Path) -> Result<BackupSummary, BackupError> {
    let dirs = state_dirs(base_dir)?;
    for dir in &dirs {
        std::fs::remove_dir_all(dir)?;
        log::debug!("Removed {}", dir.display());
    }

    log::info!("Deleted {} save-state folders", dirs.len());
    Ok(BackupSummary {
        directories: dirs.len(),
        files: 0,
    })
}
