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

//! Error types
//!
//! Each component reports failures through its own error enum. [`MasterError`]
//! aggregates them for callers that drive several components at once
//! (the launch bundle and the command-line front end).

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by operations that span several components
pub type Result<T> = std::result::Result<T, MasterError>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum MasterError {
    /// ROM ingestion failed
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),

    /// Cheat code parsing, packing or persistence failed
    #[error("Cheat error: {0}")]
    Cheat(#[from] CheatError),

    /// Save-state backup, restore or deletion failed
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    /// Configuration could not be loaded or saved
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Generic I/O failure outside a component
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// ROM ingestion errors
#[derive(Debug, Error)]
pub enum RomError {
    /// Image is neither a multiple of 16KB nor a 16KB multiple plus a 512 byte copier header
    #[error("Invalid ROM size: {len} bytes")]
    InvalidRomSize { len: usize },

    /// Archive entry did not declare its uncompressed size
    #[error("Unknown size for archive entry '{entry}'")]
    UnknownEntrySize { entry: String },

    /// Named entry is not present in the archive
    #[error("Entry '{entry}' not found in {}", archive.display())]
    EntryNotFound { archive: PathBuf, entry: String },

    /// Source is a directory or an archive, not a ROM image
    #[error("Not a ROM image: {}", path.display())]
    NotARom { path: PathBuf },

    /// Archive container could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cheat code errors
#[derive(Debug, Error)]
pub enum CheatError {
    /// Storage line did not split into exactly four `:` separated fields
    #[error("Code storage line was corrupted ({fields} fields): '{line}'")]
    CorruptStorageLine { line: String, fields: usize },

    /// Code text does not match the block grammar of its kind
    #[error("Invalid {kind} code '{code}'")]
    InvalidCode { kind: &'static str, code: String },

    #[error("Description cannot be empty")]
    EmptyDescription,

    /// Index outside the cheat list
    #[error("No code at position {index}")]
    NoSuchCode { index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Save-state backup errors
///
/// Export and import are not transactional: entries or files written before
/// one of these errors stay where they are.
#[derive(Debug, Error)]
pub enum BackupError {
    /// First archive entry is missing, misnamed or carries the wrong magic
    #[error("Bad backup header: {reason}")]
    BadHeader { reason: String },

    #[error("Couldn't write archive entry '{entry}': {source}")]
    ArchiveEntryWriteFailure {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Couldn't read archive entry '{entry}': {source}")]
    ArchiveEntryReadFailure {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Entry name escapes the base directory
    #[error("Archive entry '{entry}' has an unsafe path")]
    UnsafeEntryPath { entry: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
