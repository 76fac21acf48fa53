// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/reader.rs - Little-endian primitive readers.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `reader` Module
 *
 * Fixed-width little-endian reads. Callers are expected to have checked the
 * bounds already, so an out-of-range read is a bug and panics.
 */

pub(crate) fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> [u8; N] {
    let end = offset.checked_add(N);
    match end.and_then(|end| buffer.get(offset..end)) {
        Some(bytes) => {
            let mut array = [0u8; N];
            array.copy_from_slice(bytes);
            array
        }
        None => panic!(
            "read of {} bytes at offset {} is out of bounds for buffer of length {}",
            N,
            offset,
            buffer.len()
        ),
    }
}

/// Reads a `u16` from `buffer[offset..offset + 2]`.
///
/// # Panics
///
/// Panics if `offset + 2` exceeds the buffer length.
pub fn read_u16_le(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(read_array(buffer, offset))
}

/// Reads a `u32` from `buffer[offset..offset + 4]`.
///
/// # Panics
///
/// Panics if `offset + 4` exceeds the buffer length.
pub fn read_u32_le(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(read_array(buffer, offset))
}

/// Reads a `u64` from `buffer[offset..offset + 8]`.
///
/// # Panics
///
/// Panics if `offset + 8` exceeds the buffer length.
pub fn read_u64_le(buffer: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(read_array(buffer, offset))
}
