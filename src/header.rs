// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/header.rs - Stream header parser for GfxApiLogger dumps.
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
 * # `header` Module
 *
 * Parses the fixed 44-byte header that precedes every GfxApiLogger ring
 * buffer. The layout is packed and little-endian:
 *
 * | Field               | Offset | Size |
 * |---------------------|--------|------|
 * | signature           | 0      | 10   |
 * | version             | 10     | 2    |
 * | thread_id           | 12     | 4    |
 * | last_written_time   | 16     | 8    |
 * | write_index         | 24     | 4    |
 * | committed_index     | 28     | 4    |
 * | capture_id          | 32     | 8    |
 * | data_size           | 40     | 4    |
 */

use crate::error::HeaderError;
use crate::reader::{read_array, read_u16_le, read_u32_le, read_u64_le};

/// The tag searched for in a dump. The on-disk signature is this plus a NUL.
pub const SIGNATURE_TAG: &[u8; 9] = b"GFXAPILOG";

/// The full 10-byte signature field.
pub const SIGNATURE: &[u8; 10] = b"GFXAPILOG\0";

pub const SUPPORTED_VERSION: u16 = 2;

pub const HEADER_SIZE: usize = 44;

/// Anything larger than this is assumed to be garbage rather than a log.
pub const MAX_DATA_SIZE: u32 = 5_000_000;

/// Milliseconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
pub const FILETIME_EPOCH_OFFSET_MS: u64 = 11_644_473_600_000;

const FILETIME_TICKS_PER_MS: u64 = 10_000;

/// A validated stream header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub signature: [u8; 10],
    pub version: u16,
    /// Opaque id of the thread that owned the logger.
    pub thread_id: u32,
    /// FILETIME ticks (100 ns) of the last write.
    pub last_written_time_raw: u64,
    /// Current write cursor. Informational only.
    pub write_index: u32,
    /// Where the next write would land, i.e. the start of the oldest data.
    pub committed_index: u32,
    pub capture_id: u64,
    /// Length of the ring buffer that follows the header.
    pub data_size: u32,
}

impl StreamHeader {
    /// Parses and validates the header at `buffer[offset..]`.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// signature, version, data size ceiling, then committed index.
    pub fn parse(buffer: &[u8], offset: usize) -> Result<Self, HeaderError> {
        let available = buffer.len().saturating_sub(offset);
        if available < HEADER_SIZE {
            return Err(HeaderError::Truncated {
                needed: HEADER_SIZE,
                available,
            });
        }

        let header = Self {
            signature: read_array(buffer, offset),
            version: read_u16_le(buffer, offset + 10),
            thread_id: read_u32_le(buffer, offset + 12),
            last_written_time_raw: read_u64_le(buffer, offset + 16),
            write_index: read_u32_le(buffer, offset + 24),
            committed_index: read_u32_le(buffer, offset + 28),
            capture_id: read_u64_le(buffer, offset + 32),
            data_size: read_u32_le(buffer, offset + 40),
        };

        if &header.signature != SIGNATURE {
            return Err(HeaderError::SignatureMismatch);
        }
        if header.version != SUPPORTED_VERSION {
            return Err(HeaderError::UnsupportedVersion(header.version));
        }
        if header.data_size > MAX_DATA_SIZE {
            return Err(HeaderError::DataTooLarge(header.data_size));
        }
        if header.committed_index >= header.data_size {
            return Err(HeaderError::IndexOutOfRange {
                committed_index: header.committed_index,
                data_size: header.data_size,
            });
        }

        Ok(header)
    }

    /// Unix timestamp of the last write, in milliseconds. Clamped to zero
    /// when the tick count predates the Unix epoch.
    pub fn timestamp_ms(&self) -> u64 {
        filetime_to_unix_ms(self.last_written_time_raw)
    }

    /// Serializes the header back into its on-disk layout.
    #[cfg(test)]
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(&self.signature);
        bytes.extend(self.version.to_le_bytes());
        bytes.extend(self.thread_id.to_le_bytes());
        bytes.extend(self.last_written_time_raw.to_le_bytes());
        bytes.extend(self.write_index.to_le_bytes());
        bytes.extend(self.committed_index.to_le_bytes());
        bytes.extend(self.capture_id.to_le_bytes());
        bytes.extend(self.data_size.to_le_bytes());
        bytes
    }
}

pub fn filetime_to_unix_ms(ticks: u64) -> u64 {
    (ticks / FILETIME_TICKS_PER_MS).saturating_sub(FILETIME_EPOCH_OFFSET_MS)
}

#[cfg(test)]
pub(crate) fn sample_header() -> StreamHeader {
    StreamHeader {
        signature: *SIGNATURE,
        version: SUPPORTED_VERSION,
        thread_id: 42,
        last_written_time_raw: 137_500_000_000_000,
        write_index: 0,
        committed_index: 0,
        capture_id: 99,
        data_size: 24,
    }
}
