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

//! Helpers shared by unit tests that need malformed archives

/// Signature of a zip central directory file header
const CENTRAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];
const CENTRAL_HEADER_LEN: usize = 46;
const ZIP64_EXTRA_TAG: u16 = 0x0001;

fn read_u16(bytes: &[u8], at: usize) -> usize {
    u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
}

/// Rewrite the uncompressed size the central directory declares for `entry`
///
/// The entry must have been written with `large_file(true)` so its central
/// header carries a zip64 extra field. The 32-bit size is set to `0xFFFFFFFF`,
/// which makes readers take the size from that field instead.
pub(crate) fn declare_uncompressed_size(archive: &mut [u8], entry: &str, size: u64) {
    let mut pos = 0;
    while pos + CENTRAL_HEADER_LEN <= archive.len() {
        if archive[pos..pos + 4] != CENTRAL_HEADER_SIGNATURE {
            pos += 1;
            continue;
        }

        let name_start = pos + CENTRAL_HEADER_LEN;
        let extra_start = name_start + read_u16(archive, pos + 28);
        let extra_end = extra_start + read_u16(archive, pos + 30);
        if &archive[name_start..extra_start] != entry.as_bytes() {
            pos += 1;
            continue;
        }

        archive[pos + 24..pos + 28].copy_from_slice(&u32::MAX.to_le_bytes());
        let mut field = extra_start;
        while field + 4 <= extra_end {
            let tag = read_u16(archive, field) as u16;
            let len = read_u16(archive, field + 2);
            if tag == ZIP64_EXTRA_TAG {
                archive[field + 4..field + 12].copy_from_slice(&size.to_le_bytes());
                return;
            }
            field += 4 + len;
        }
        panic!("Entry '{}' has no zip64 extra field", entry);
    }
    panic!("Entry '{}' not found in central directory", entry);
}
