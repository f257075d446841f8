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

//! Cheat code handling
//!
//! Supports Pro Action Replay and Game Genie codes. Codes are entered as
//! dash-separated hex blocks, stored one per line in a text file next to the
//! ROM's save states, and packed into 64-bit words for the emulation core.
//!
//! # Packed layout
//!
//! | Kind              | Word                                                    |
//! |-------------------|---------------------------------------------------------|
//! | Action Replay     | `bit 63 \| block1 << 16 \| block2`                      |
//! | Game Genie (2)    | `bit 62 \| block1 << 24 \| block2 << 12`                |
//! | Game Genie (3)    | `bit 62 \| bit 61 \| block1 << 24 \| block2 << 12 \| block3` |
//!
//! # Example
//!
//! ```
//! use mastersave::core::cheats::{CheatCode, CodeKind};
//!
//! let code = CheatCode::new(CodeKind::ActionReplay, "Infinite lives", "00C0-0A05").unwrap();
//! assert_eq!(code.pack().unwrap().bits(), 0x8000_0000_00C0_0A05);
//! ```

mod storage;

pub use storage::{CheatList, CODES_FILE_NAME};

use crate::core::error::CheatError;
use bitflags::bitflags;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Marker bits in the top of a packed cheat word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CheatFlags: u64 {
        /// Word holds a Pro Action Replay code
        const ACTION_REPLAY = 1 << 63;
        /// Word holds a Game Genie code
        const GAME_GENIE = 1 << 62;
        /// Game Genie code carries the optional third block
        const GG_THIRD_BLOCK = 1 << 61;
    }
}

/// Cheat device a code was written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CodeKind {
    /// Pro Action Replay: two 4-digit hex blocks
    ActionReplay,
    /// Game Genie: two or three 3-digit hex blocks
    GameGenie,
}

impl CodeKind {
    /// Tag used in the storage format and the list display
    pub fn tag(self) -> &'static str {
        match self {
            CodeKind::ActionReplay => "AR",
            CodeKind::GameGenie => "GG",
        }
    }

    /// Number of hex digits per block
    pub fn block_len(self) -> usize {
        match self {
            CodeKind::ActionReplay => 4,
            CodeKind::GameGenie => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            CodeKind::ActionReplay => "Action Replay",
            CodeKind::GameGenie => "Game Genie",
        }
    }

    /// Select the kind from a storage tag; anything but `"AR"` is Game Genie
    pub fn from_tag(tag: &str) -> Self {
        if tag == "AR" {
            CodeKind::ActionReplay
        } else {
            CodeKind::GameGenie
        }
    }
}

/// Filter user input for one code block
///
/// Uppercases the input, keeps only `0-9` and `A-F` and truncates to the
/// block length of `kind`.
///
/// # Example
///
/// ```
/// use mastersave::core::cheats::{filter_block_input, CodeKind};
///
/// assert_eq!(filter_block_input(CodeKind::GameGenie, "a-z9fc"), "A9F");
/// ```
pub fn filter_block_input(kind: CodeKind, input: &str) -> String {
    input
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| matches!(c, '0'..='9' | 'A'..='F'))
        .take(kind.block_len())
        .collect()
}

/// Filter user input for a code description
///
/// Removes `:` (the storage field separator) and line breaks.
pub fn filter_description(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ':' | '\n' | '\r'))
        .collect()
}

/// A single cheat code as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheatCode {
    kind: CodeKind,
    description: String,
    code: String,
    enabled: bool,
}

impl CheatCode {
    /// Create a new (disabled) code
    ///
    /// The description is passed through [`filter_description`] and must not
    /// end up empty. The code text must match the block grammar of `kind`.
    ///
    /// # Returns
    ///
    /// - `Ok(CheatCode)` for a well-formed code
    /// - `Err(CheatError::EmptyDescription)` or `Err(CheatError::InvalidCode)` otherwise
    pub fn new(kind: CodeKind, description: &str, code: &str) -> Result<Self, CheatError> {
        let description = filter_description(description);
        if description.is_empty() {
            return Err(CheatError::EmptyDescription);
        }
        parse_blocks(kind, code)?;

        Ok(Self {
            kind,
            description,
            code: code.to_string(),
            enabled: false,
        })
    }

    /// Create a code from the separate block fields of the entry dialog
    ///
    /// Action Replay needs exactly two blocks. Game Genie needs two, with an
    /// optional third; an empty third block counts as absent.
    pub fn from_blocks(
        kind: CodeKind,
        description: &str,
        blocks: &[&str],
    ) -> Result<Self, CheatError> {
        let blocks: Vec<&str> = match (kind, blocks) {
            (CodeKind::GameGenie, [first, second, ""]) => vec![*first, *second],
            _ => blocks.to_vec(),
        };
        Self::new(kind, description, &blocks.join("-"))
    }

    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Dash-separated code text, e.g. `"ABC-123-DEF"`
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the enabled flag, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Pack the code into the 64-bit word consumed by the emulation core
    pub fn pack(&self) -> Result<PackedCheat, CheatError> {
        let blocks = parse_blocks(self.kind, &self.code)?;

        let word = match (self.kind, blocks.as_slice()) {
            (CodeKind::ActionReplay, &[first, second]) => {
                CheatFlags::ACTION_REPLAY.bits() | (first << 16) | second
            }
            (CodeKind::GameGenie, &[first, second]) => {
                CheatFlags::GAME_GENIE.bits() | (first << 24) | (second << 12)
            }
            (CodeKind::GameGenie, &[first, second, third]) => {
                (CheatFlags::GAME_GENIE | CheatFlags::GG_THIRD_BLOCK).bits()
                    | (first << 24)
                    | (second << 12)
                    | third
            }
            _ => return Err(self.invalid()),
        };

        Ok(PackedCheat(word))
    }

    /// Encode as a storage line (without the trailing newline)
    ///
    /// Format: `<AR|GG>:<description>:<code>:<enabled|disabled>`
    pub fn to_storage_line(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.kind.tag(),
            self.description,
            self.code,
            if self.enabled { "enabled" } else { "disabled" }
        )
    }

    /// Decode a storage line
    ///
    /// The line must split into exactly four `:` separated fields, not
    /// counting trailing empty ones. The code text is not validated here;
    /// [`CheatCode::pack`] rejects malformed codes.
    pub fn from_storage_line(line: &str) -> Result<Self, CheatError> {
        let mut fields: Vec<&str> = line.split(':').collect();
        while fields.last() == Some(&"") {
            fields.pop();
        }
        let [tag, description, code, state] = fields.as_slice() else {
            return Err(CheatError::CorruptStorageLine {
                line: line.to_string(),
                fields: fields.len(),
            });
        };

        Ok(Self {
            kind: CodeKind::from_tag(tag),
            description: description.to_string(),
            code: code.to_string(),
            enabled: *state == "enabled",
        })
    }

    fn invalid(&self) -> CheatError {
        CheatError::InvalidCode {
            kind: self.kind.name(),
            code: self.code.clone(),
        }
    }
}

impl fmt::Display for CheatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.tag(), self.description)
    }
}

impl FromStr for CheatCode {
    type Err = CheatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_storage_line(s)
    }
}

/// Split code text into numeric blocks, checking the grammar of `kind`
fn parse_blocks(kind: CodeKind, code: &str) -> Result<Vec<u64>, CheatError> {
    let invalid = || CheatError::InvalidCode {
        kind: kind.name(),
        code: code.to_string(),
    };

    let parts: Vec<&str> = code.split('-').collect();
    let count_ok = match kind {
        CodeKind::ActionReplay => parts.len() == 2,
        CodeKind::GameGenie => parts.len() == 2 || parts.len() == 3,
    };
    if !count_ok {
        return Err(invalid());
    }

    parts
        .iter()
        .map(|part| {
            let well_formed = part.len() == kind.block_len()
                && part.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F'));
            if !well_formed {
                return Err(invalid());
            }
            u64::from_str_radix(part, 16).map_err(|_| invalid())
        })
        .collect()
}

/// Packed 64-bit cheat word handed to the emulation core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PackedCheat(u64);

impl PackedCheat {
    /// Raw word value
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Marker bits of the word
    pub fn flags(self) -> CheatFlags {
        CheatFlags::from_bits_truncate(self.0)
    }

    /// Kind encoded by the marker bits, if any
    pub fn kind(self) -> Option<CodeKind> {
        let flags = self.flags();
        if flags.contains(CheatFlags::ACTION_REPLAY) {
            Some(CodeKind::ActionReplay)
        } else if flags.contains(CheatFlags::GAME_GENIE) {
            Some(CodeKind::GameGenie)
        } else {
            None
        }
    }
}

impl fmt::Display for PackedCheat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Pack the enabled codes of a list, preserving list order
///
/// This is the set handed to the emulation core; disabled codes are skipped.
pub fn pack_enabled<'a, I>(codes: I) -> Result<Vec<PackedCheat>, CheatError>
where
    I: IntoIterator<Item = &'a CheatCode>,
{
    codes
        .into_iter()
        .filter(|code| code.is_enabled())
        .map(CheatCode::pack)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_action_replay() {
        let code = CheatCode::new(CodeKind::ActionReplay, "test", "ABCD-1234").unwrap();
        let packed = code.pack().unwrap();

        assert_ne!(packed.bits() & (1 << 63), 0);
        assert_eq!(packed.bits() & (1 << 62), 0);
        assert_eq!(packed.bits() & 0xFFFF_FFFF, (0xABCD << 16) | 0x1234);
        assert_eq!(packed.kind(), Some(CodeKind::ActionReplay));
    }

    #[test]
    fn test_pack_game_genie_three_blocks() {
        let code = CheatCode::new(CodeKind::GameGenie, "test", "ABC-123-DEF").unwrap();
        let packed = code.pack().unwrap();

        assert!(packed
            .flags()
            .contains(CheatFlags::GAME_GENIE | CheatFlags::GG_THIRD_BLOCK));
        assert!(!packed.flags().contains(CheatFlags::ACTION_REPLAY));
        assert_eq!(
            packed.bits(),
            0x6000_0000_0000_0000 | (0xABC << 24) | (0x123 << 12) | 0xDEF
        );
    }

    #[test]
    fn test_pack_game_genie_two_blocks() {
        let code = CheatCode::new(CodeKind::GameGenie, "test", "00F-A1B").unwrap();
        let packed = code.pack().unwrap();

        assert_eq!(packed.bits(), 0x4000_0000_0000_0000 | (0x00F << 24) | (0xA1B << 12));
        assert!(!packed.flags().contains(CheatFlags::GG_THIRD_BLOCK));
        assert_eq!(packed.to_string(), "400000000FA1B000");
    }

    #[test]
    fn test_new_rejects_bad_grammar() {
        let bad = [
            (CodeKind::ActionReplay, "ABC-1234"),
            (CodeKind::ActionReplay, "ABCD-1234-5678"),
            (CodeKind::ActionReplay, "abcd-1234"),
            (CodeKind::ActionReplay, "ABCD1234"),
            (CodeKind::GameGenie, "ABC"),
            (CodeKind::GameGenie, "ABC-123-DEF-456"),
            (CodeKind::GameGenie, "ABCD-123"),
            (CodeKind::GameGenie, "ABG-123"),
        ];
        for (kind, code) in bad {
            assert!(
                matches!(
                    CheatCode::new(kind, "desc", code),
                    Err(CheatError::InvalidCode { .. })
                ),
                "{} should be rejected",
                code
            );
        }
    }

    #[test]
    fn test_new_filters_description() {
        let code = CheatCode::new(CodeKind::GameGenie, "Max: power", "ABC-123").unwrap();
        assert_eq!(code.description(), "Max power");
        assert!(!code.is_enabled());

        assert!(matches!(
            CheatCode::new(CodeKind::GameGenie, ":::", "ABC-123"),
            Err(CheatError::EmptyDescription)
        ));
    }

    #[test]
    fn test_from_blocks() {
        let ar = CheatCode::from_blocks(CodeKind::ActionReplay, "a", &["00C0", "0A05"]).unwrap();
        assert_eq!(ar.code(), "00C0-0A05");

        let gg = CheatCode::from_blocks(CodeKind::GameGenie, "g", &["ABC", "123", ""]).unwrap();
        assert_eq!(gg.code(), "ABC-123");

        let gg3 = CheatCode::from_blocks(CodeKind::GameGenie, "g", &["ABC", "123", "DEF"]).unwrap();
        assert_eq!(gg3.code(), "ABC-123-DEF");

        assert!(CheatCode::from_blocks(CodeKind::GameGenie, "g", &["ABC", "12", ""]).is_err());
        assert!(CheatCode::from_blocks(CodeKind::ActionReplay, "a", &["00C0"]).is_err());
        assert!(CheatCode::from_blocks(CodeKind::ActionReplay, "", &["00C0", "0A05"]).is_err());
    }

    #[test]
    fn test_filter_block_input() {
        assert_eq!(filter_block_input(CodeKind::ActionReplay, "ab-cd-ef"), "ABCD");
        assert_eq!(filter_block_input(CodeKind::ActionReplay, "xyz"), "");
        assert_eq!(filter_block_input(CodeKind::GameGenie, "1 2 3 4"), "123");
        assert_eq!(filter_block_input(CodeKind::GameGenie, "ÄB9"), "B9");
    }

    #[test]
    fn test_filter_description() {
        assert_eq!(filter_description("a:b:c"), "abc");
        assert_eq!(filter_description("line\r\nbreak"), "linebreak");
    }

    #[test]
    fn test_storage_line_encode() {
        let mut code = CheatCode::new(CodeKind::ActionReplay, "Lives", "00C0-0A05").unwrap();
        assert_eq!(code.to_storage_line(), "AR:Lives:00C0-0A05:disabled");

        code.toggle();
        assert_eq!(code.to_storage_line(), "AR:Lives:00C0-0A05:enabled");
        assert_eq!(code.to_string(), "AR: Lives");
    }

    #[test]
    fn test_storage_line_decode() {
        let code: CheatCode = "GG:Jump:ABC-123-DEF:enabled".parse().unwrap();
        assert_eq!(code.kind(), CodeKind::GameGenie);
        assert_eq!(code.description(), "Jump");
        assert_eq!(code.code(), "ABC-123-DEF");
        assert!(code.is_enabled());

        // Unknown tags fall back to Game Genie, unknown states to disabled
        let code = CheatCode::from_storage_line("XX:Jump:ABC-123:on").unwrap();
        assert_eq!(code.kind(), CodeKind::GameGenie);
        assert!(!code.is_enabled());
    }

    #[test]
    fn test_storage_line_wrong_field_count() {
        for line in ["AR:x:0000-0000", "AR:x:0000-0000:enabled:extra", "nonsense"] {
            match CheatCode::from_storage_line(line) {
                Err(CheatError::CorruptStorageLine { fields, .. }) => assert_ne!(fields, 4),
                other => panic!("Expected CorruptStorageLine for '{}', got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_storage_line_trailing_empty_fields() {
        for (line, expected) in [("AR:Lives::", 2), ("AR:x:0000-0000:", 3), (":::", 0)] {
            match CheatCode::from_storage_line(line) {
                Err(CheatError::CorruptStorageLine { fields, .. }) => assert_eq!(fields, expected),
                other => panic!("Expected CorruptStorageLine for '{}', got {:?}", line, other),
            }
        }

        // Empty fields before the last one still count
        let code = CheatCode::from_storage_line("AR:::enabled").unwrap();
        assert_eq!(code.description(), "");
        assert!(code.is_enabled());
    }

    #[test]
    fn test_pack_rejects_corrupt_stored_code() {
        let code = CheatCode::from_storage_line("AR:x:nothex:enabled").unwrap();
        assert!(matches!(code.pack(), Err(CheatError::InvalidCode { .. })));
    }

    #[test]
    fn test_pack_enabled_preserves_order() {
        let mut first = CheatCode::new(CodeKind::GameGenie, "one", "111-222").unwrap();
        let second = CheatCode::new(CodeKind::ActionReplay, "two", "0000-0001").unwrap();
        let mut third = CheatCode::new(CodeKind::ActionReplay, "three", "0000-0003").unwrap();
        first.set_enabled(true);
        third.set_enabled(true);

        let packed = pack_enabled(&[first.clone(), second, third.clone()]).unwrap();
        assert_eq!(packed, vec![first.pack().unwrap(), third.pack().unwrap()]);
    }

    fn arb_code() -> impl Strategy<Value = CheatCode> {
        let ar = ("[0-9A-F]{4}", "[0-9A-F]{4}")
            .prop_map(|(a, b)| (CodeKind::ActionReplay, format!("{}-{}", a, b)));
        let gg = ("[0-9A-F]{3}", "[0-9A-F]{3}", proptest::option::of("[0-9A-F]{3}")).prop_map(
            |(a, b, c)| match c {
                Some(c) => (CodeKind::GameGenie, format!("{}-{}-{}", a, b, c)),
                None => (CodeKind::GameGenie, format!("{}-{}", a, b)),
            },
        );
        (prop_oneof![ar, gg], "[^:\r\n]{1,24}", any::<bool>()).prop_filter_map(
            "description must survive filtering",
            |((kind, code), description, enabled)| {
                let mut code = CheatCode::new(kind, &description, &code).ok()?;
                code.set_enabled(enabled);
                Some(code)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_storage_line_round_trip(code in arb_code()) {
            let decoded = CheatCode::from_storage_line(&code.to_storage_line()).unwrap();
            prop_assert_eq!(decoded, code);
        }

        #[test]
        fn prop_marker_bits_exclusive(code in arb_code()) {
            let flags = code.pack().unwrap().flags();
            prop_assert!(
                flags.contains(CheatFlags::ACTION_REPLAY) != flags.contains(CheatFlags::GAME_GENIE)
            );
            if flags.contains(CheatFlags::GG_THIRD_BLOCK) {
                prop_assert!(flags.contains(CheatFlags::GAME_GENIE));
            }
        }
    }
}
