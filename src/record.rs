// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/record.rs - Record framing and decoding for GfxApiLogger streams.
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
 * # `record` Module
 *
 * Extracts records from a linearized ring buffer.
 *
 * The logger appends each record followed by a trailing `u32` holding the
 * record's length, so the newest record's size field sits at the end of the
 * buffer. There is no record count: decoding walks backward from the end
 * until the remaining bytes can no longer describe a record.
 *
 * ```text
 * ... | opcode | declared_size | payload | size | opcode | ... | size |
 *     |<-------------- size ------------>|
 * ```
 */

use std::iter::FusedIterator;

use crate::error::RecordError;
use crate::reader::read_u32_le;

/// Length of the trailing framing field after every record.
pub const SIZE_FIELD_LEN: usize = 4;

/// Length of the opcode and declared size fields at the start of a record.
pub const RECORD_PREFIX_LEN: usize = 8;

/// One logged command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub opcode: u32,
    /// Payload size as the encoder saw it. This is not the framing size.
    pub declared_size: u32,
    /// Bytes following the 8-byte prefix.
    pub payload: Vec<u8>,
}

impl Record {
    /// Decodes a framed record. `offset` is only used for error reporting.
    pub fn from_bytes(raw: &[u8], offset: usize) -> Result<Self, RecordError> {
        if raw.len() < RECORD_PREFIX_LEN {
            return Err(RecordError::Malformed {
                offset,
                size: raw.len(),
            });
        }

        Ok(Self {
            opcode: read_u32_le(raw, 0),
            declared_size: read_u32_le(raw, 4),
            payload: raw[RECORD_PREFIX_LEN..].to_vec(),
        })
    }
}

/// Whether a size field still fits in front of `cursor`.
pub fn has_size_field(cursor: usize) -> bool {
    cursor >= SIZE_FIELD_LEN
}

/// Whether a size field read just before `cursor` marks the oldest end of the
/// valid data rather than a record.
pub fn is_oldest_boundary(size: usize, cursor: usize) -> bool {
    size == 0 || size > cursor
}

/// Iterator over the raw frames of a linear buffer, newest first.
///
/// Yields `(offset, bytes)` for each record, where `offset` is the position of
/// the record within the buffer.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> Frames<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: buffer.len(),
        }
    }

    fn finish(&mut self) -> Option<(usize, &'a [u8])> {
        self.cursor = 0;
        None
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if !has_size_field(self.cursor) {
            return self.finish();
        }

        let size_offset = self.cursor - SIZE_FIELD_LEN;
        let size = read_u32_le(self.buffer, size_offset) as usize;
        if is_oldest_boundary(size, size_offset) {
            return self.finish();
        }

        let start = size_offset - size;
        self.cursor = start;
        Some((start, &self.buffer[start..size_offset]))
    }
}

impl FusedIterator for Frames<'_> {}

/// Decodes every record in `linear`, oldest first.
///
/// A frame too short to hold the opcode and declared size fails the whole
/// buffer.
pub fn decode_records(linear: &[u8]) -> Result<Vec<Record>, RecordError> {
    let mut records = Frames::new(linear)
        .map(|(offset, raw)| Record::from_bytes(raw, offset))
        .collect::<Result<Vec<_>, _>>()?;
    records.reverse();
    Ok(records)
}

/// Frames a record the way the logger writes it.
#[cfg(test)]
pub(crate) fn encode_record(opcode: u32, declared_size: u32, payload: &[u8]) -> Vec<u8> {
    let size = (RECORD_PREFIX_LEN + payload.len()) as u32;
    let mut bytes = Vec::with_capacity(size as usize + SIZE_FIELD_LEN);
    bytes.extend(opcode.to_le_bytes());
    bytes.extend(declared_size.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes.extend(size.to_le_bytes());
    bytes
}
