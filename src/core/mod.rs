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

//! Core components of the front end
//!
//! - [`rom`]: ROM ingestion, browsing and checksums
//! - [`cheats`]: Action Replay / Game Genie codes and per-ROM cheat lists
//! - [`backup`]: save-state backup archives
//! - [`states`]: per-ROM save-state folders
//! - [`launch`]: hand-off bundle for the emulation core
//! - [`config`]: front-end options
//! - [`error`]: error types

pub mod backup;
pub mod cheats;
pub mod config;
pub mod error;
pub mod launch;
pub mod rom;
pub mod states;

#[cfg(test)]
pub(crate) mod test_support;
