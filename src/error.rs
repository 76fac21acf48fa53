// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for GfxApiLogger stream decoding.
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
 * # `error` Module
 *
 * Errors that mark a single log stream as undecodable. None of these abort a
 * scan: the scanner attaches them to a [crate::scanner::FailedStream] and
 * moves on to the next signature.
 */

use thiserror::Error;

/// A header that failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Fewer than [crate::header::HEADER_SIZE] bytes remain after the signature.
    #[error("header truncated: need {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Signature doesn't match")]
    SignatureMismatch,

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("data size is larger than 5MB ({0} bytes), likely garbage/corrupted data")]
    DataTooLarge(u32),

    #[error(
        "committed index {committed_index} is larger than buffer size {data_size}, likely garbage/corrupted data"
    )]
    IndexOutOfRange {
        committed_index: u32,
        data_size: u32,
    },
}

/// A framed record that cannot hold its own opcode/size prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed record at offset {offset}: {size} bytes is shorter than the 8-byte prefix")]
    Malformed { offset: usize, size: usize },
}

/// Why a stream occurrence could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("data region truncated: header declares {declared} bytes, only {available} available")]
    DataTruncated { declared: usize, available: usize },

    #[error(transparent)]
    Record(#[from] RecordError),
}
