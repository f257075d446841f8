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

//! mastersave command-line front end
//!
//! Browses and validates ROMs, edits per-ROM cheat lists and manages the
//! save-state tree (listing, backup, restore, wipe).

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use mastersave::core::backup;
use mastersave::core::cheats::{CheatCode, CheatList, CodeKind};
use mastersave::core::config::Options;
use mastersave::core::launch::LaunchBundle;
use mastersave::core::rom::RomSource;
use mastersave::core::states::{self, SaveStates};
use mastersave::Result;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Master System / Game Gear ROM, cheat and save-state manager
#[derive(Parser)]
#[command(name = "mastersave")]
#[command(version)]
struct Cli {
    /// Options file
    #[arg(long, global = true, default_value = "mastersave.toml")]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a ROM and show what would be handed to the core
    Ingest {
        /// ROM file, or zip archive when --entry is given
        path: PathBuf,
        /// Entry inside the zip archive
        #[arg(long)]
        entry: Option<String>,
    },

    /// List ROMs in a folder or zip archive
    Browse {
        path: PathBuf,
        /// Case-insensitive name filter
        #[arg(long)]
        filter: Option<String>,
    },

    /// Edit the cheat list of a ROM
    Cheats {
        /// ROM checksum (8 hex digits)
        checksum: String,
        #[command(subcommand)]
        action: CheatAction,
    },

    /// Manage the save states of a ROM
    States {
        /// ROM checksum (8 hex digits)
        checksum: String,
        #[command(subcommand)]
        action: StateAction,
    },

    /// Back up every save-state folder into a zip archive
    Export {
        /// Archive path (defaults to a timestamped name)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Restore a backup archive
    Import { archive: PathBuf },

    /// Delete every save-state folder
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CheatAction {
    List,
    Add {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        description: String,
        /// Code blocks separated by '-'
        #[arg(long)]
        code: String,
        /// Enable the code right away
        #[arg(long)]
        enabled: bool,
    },
    Toggle { index: usize },
    Remove { index: usize },
    /// Show the packed words of the enabled codes
    Pack,
}

#[derive(Subcommand)]
enum StateAction {
    List,
    Delete { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Ar,
    Gg,
}

impl From<KindArg> for CodeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ar => CodeKind::ActionReplay,
            KindArg::Gg => CodeKind::GameGenie,
        }
    }
}

fn load_options(path: &Path) -> Result<Options> {
    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env loaded: {}", e);
    }
    let mut options = Options::load(path)?;
    options.apply_env_overrides();
    Ok(options)
}

fn ingest(options: &Options, path: PathBuf, entry: Option<String>, as_json: bool) -> Result<()> {
    let source = match entry {
        Some(entry) => RomSource::ArchiveEntry {
            archive: path,
            entry,
        },
        None => RomSource::Filesystem(path),
    };
    let bundle = LaunchBundle::prepare(options, &source)?;
    let checksum = bundle.rom.checksum();

    if as_json {
        let report = json!({
            "name": source.name(),
            "platform": bundle.rom.platform(),
            "size": bundle.rom.len(),
            "banks": bundle.rom.bank_count(),
            "checksum": checksum,
            "cheats": bundle.cheats,
        });
        println!("{}", report);
    } else {
        println!(
            "{}: {:?}, {} bytes ({} banks), checksum {}",
            source.name(),
            bundle.rom.platform(),
            bundle.rom.len(),
            bundle.rom.bank_count(),
            checksum
        );
        for cheat in &bundle.cheats {
            println!("  cheat {}", cheat);
        }
    }
    Ok(())
}

fn browse(path: PathBuf, filter: Option<String>, as_json: bool) -> Result<()> {
    let filter = filter.as_deref();
    let entries = if path.is_dir() {
        RomSource::list_dir(&path, filter)?
    } else {
        RomSource::list_archive(&path, filter)?
    };

    if as_json {
        let names: Vec<_> = entries
            .iter()
            .map(|e| json!({ "name": e.name(), "container": e.is_container() }))
            .collect();
        println!("{}", serde_json::Value::Array(names));
    } else {
        for entry in &entries {
            let marker = if entry.is_container() { "/" } else { "" };
            println!("{}{}", entry.name(), marker);
        }
    }
    Ok(())
}

fn cheats(options: &Options, checksum: &str, action: CheatAction, as_json: bool) -> Result<()> {
    let data_dir = &options.data_dir;
    let mut list = CheatList::load(data_dir, checksum)?;

    match action {
        CheatAction::List => {
            if as_json {
                let codes: Vec<_> = list
                    .iter()
                    .map(|c| {
                        json!({
                            "kind": c.kind().tag(),
                            "description": c.description(),
                            "code": c.code(),
                            "enabled": c.is_enabled(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::Value::Array(codes));
            } else {
                for (index, code) in list.iter().enumerate() {
                    let state = if code.is_enabled() { "on" } else { "off" };
                    println!("{:3} [{}] {} ({})", index, state, code, code.code());
                }
            }
        }
        CheatAction::Add {
            kind,
            description,
            code,
            enabled,
        } => {
            let mut code = CheatCode::new(kind.into(), &description, &code)?;
            code.set_enabled(enabled);
            list.add(code);
            list.save(data_dir, checksum)?;
        }
        CheatAction::Toggle { index } => {
            let enabled = list.toggle(index)?;
            list.save(data_dir, checksum)?;
            println!("Code {} {}", index, if enabled { "enabled" } else { "disabled" });
        }
        CheatAction::Remove { index } => {
            let removed = list.remove(index)?;
            list.save(data_dir, checksum)?;
            println!("Removed {}", removed);
        }
        CheatAction::Pack => {
            let packed = list.packed_enabled()?;
            if as_json {
                println!("{}", json!(packed));
            } else {
                for word in packed {
                    println!("{}", word);
                }
            }
        }
    }
    Ok(())
}

fn save_states(options: &Options, checksum: &str, action: StateAction, as_json: bool) -> Result<()> {
    let saves = SaveStates::new(&options.data_dir, checksum);

    match action {
        StateAction::List => {
            let names: Vec<String> = saves
                .list()?
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            if as_json {
                println!("{}", json!(names));
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
        StateAction::Delete { name } => saves.delete(&name)?,
    }
    Ok(())
}

fn report(summary: backup::BackupSummary, verb: &str, as_json: bool) {
    if as_json {
        println!("{}", json!(summary));
    } else {
        println!(
            "{} {} folders, {} files",
            verb, summary.directories, summary.files
        );
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = load_options(&cli.config)?;
    let as_json = cli.json;

    match cli.command {
        Commands::Ingest { path, entry } => ingest(&options, path, entry, as_json),
        Commands::Browse { path, filter } => browse(path, filter, as_json),
        Commands::Cheats { checksum, action } => cheats(&options, &checksum, action, as_json),
        Commands::States { checksum, action } => save_states(&options, &checksum, action, as_json),
        Commands::Export { out } => {
            let out = out.unwrap_or_else(|| {
                PathBuf::from(states::backup_file_name(Local::now().naive_local()))
            });
            let summary = backup::export_to_file(&options.data_dir, &out)?;
            log::info!("Backup written to {}", out.display());
            report(summary, "Exported", as_json);
            Ok(())
        }
        Commands::Import { archive } => {
            let summary = backup::import_file(&options.data_dir, &archive)?;
            report(summary, "Imported", as_json);
            Ok(())
        }
        Commands::DeleteAll { yes } => {
            if !yes {
                log::warn!("Refusing to delete save states without --yes");
                return Ok(());
            }
            let summary = backup::delete_all(&options.data_dir)?;
            report(summary, "Deleted", as_json);
            Ok(())
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}
