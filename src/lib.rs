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

//! mastersave: ROM, cheat and save-state management for a Master System /
//! Game Gear emulator front end
//!
//! Everything here runs before (or beside) the emulation core: ROM images are
//! validated and tagged, cheat codes are parsed and packed into the words the
//! core applies, and the save-state tree can be backed up and restored as a
//! single zip archive.
//!
//! # Example
//!
//! ```no_run
//! use mastersave::core::config::Options;
//! use mastersave::core::launch::LaunchBundle;
//! use mastersave::core::rom::RomSource;
//! use std::path::PathBuf;
//!
//! let options = Options::default();
//! let source = RomSource::Filesystem(PathBuf::from("roms/sonic.sms"));
//! let bundle = LaunchBundle::prepare(&options, &source)?;
//! println!("{} banks", bundle.rom.bank_count());
//! # Ok::<(), mastersave::MasterError>(())
//! ```
//!
//! # Modules
//!
//! - [`core::rom`]: 16KB bank validation and copier-header stripping
//! - [`core::cheats`]: code grammar, 64-bit packing and storage lines
//! - [`core::backup`]: `CM02_BACKUP` archives of the save-state tree
//!
//! # Error Handling
//!
//! Each component returns its own error type; operations spanning several
//! components return [`core::error::Result<T>`], an alias for
//! `Result<T, MasterError>`.

pub mod core;

// Re-export commonly used types
pub use core::error::{MasterError, Result};
