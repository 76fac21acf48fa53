// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/scanner.rs - Signature scanner for GfxApiLogger streams.
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
 * # `scanner` Module
 *
 * Finds every GfxApiLogger stream embedded in a blob and decodes it.
 *
 * The surrounding container (usually a minidump) is not parsed. The scanner
 * looks for the signature tag anywhere in the input, and each hit is decoded
 * independently: a corrupted hit becomes a [FailedStream] and the scan
 * carries on.
 *
 * ## Usage Example
 *
 * ```no_run
 * use gfxlogs::scanner::{scan, Stream};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let blob = std::fs::read("crash.dmp")?;
 *     for stream in scan(&blob) {
 *         match stream {
 *             Stream::Decoded(s) => println!("{}: {} records", s.position, s.records.len()),
 *             Stream::Failed(s) => println!("{}: {}", s.position, s.error),
 *         }
 *     }
 *     Ok(())
 * }
 * ```
 */

use memchr::memmem;
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::header::{HEADER_SIZE, SIGNATURE_TAG, StreamHeader};
use crate::record::{Record, decode_records};
use crate::ring::linearize;

/// A stream whose header and records decoded cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStream {
    /// Offset of the signature within the scanned blob.
    pub position: usize,
    /// Unix milliseconds of the last write. Zero when the raw time predates 1970.
    pub timestamp_ms: u64,
    pub thread_id: u32,
    pub capture_id: u64,
    pub write_index: u32,
    /// Records, oldest first.
    pub records: Vec<Record>,
}

/// A signature hit that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStream {
    pub position: usize,
    pub error: StreamError,
}

/// One signature occurrence in a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    Decoded(DecodedStream),
    Failed(FailedStream),
}

impl Stream {
    pub fn position(&self) -> usize {
        match self {
            Stream::Decoded(s) => s.position,
            Stream::Failed(s) => s.position,
        }
    }

    pub fn error(&self) -> Option<&StreamError> {
        match self {
            Stream::Decoded(_) => None,
            Stream::Failed(s) => Some(&s.error),
        }
    }

    pub fn as_decoded(&self) -> Option<&DecodedStream> {
        match self {
            Stream::Decoded(s) => Some(s),
            Stream::Failed(_) => None,
        }
    }
}

/// Offsets of every signature tag in `blob`, ascending.
///
/// Each search resumes one byte past the previous match, so overlapping tags
/// are all reported.
pub fn find_signatures(blob: &[u8]) -> Vec<usize> {
    let finder = memmem::Finder::new(SIGNATURE_TAG);
    let mut positions = Vec::new();
    let mut start = 0;
    while let Some(found) = blob.get(start..).and_then(|rest| finder.find(rest)) {
        let position = start + found;
        positions.push(position);
        start = position + 1;
    }
    positions
}

/// Decodes the stream whose signature starts at `position`.
pub fn decode_stream(blob: &[u8], position: usize) -> Result<DecodedStream, StreamError> {
    let header = StreamHeader::parse(blob, position)?;

    let data_start = position + HEADER_SIZE;
    let declared = header.data_size as usize;
    let available = blob.len() - data_start;
    if declared > available {
        return Err(StreamError::DataTruncated {
            declared,
            available,
        });
    }

    let data = &blob[data_start..data_start + declared];
    let linear = linearize(data, header.committed_index as usize);
    let records = decode_records(&linear)?;

    Ok(DecodedStream {
        position,
        timestamp_ms: header.timestamp_ms(),
        thread_id: header.thread_id,
        capture_id: header.capture_id,
        write_index: header.write_index,
        records,
    })
}

/// Finds and decodes every stream in `blob`, in order of position.
pub fn scan(blob: &[u8]) -> Vec<Stream> {
    find_signatures(blob)
        .into_iter()
        .map(|position| {
            debug!(position, "found stream signature");
            match decode_stream(blob, position) {
                Ok(stream) => {
                    debug!(
                        position,
                        thread_id = stream.thread_id,
                        capture_id = stream.capture_id,
                        records = stream.records.len(),
                        "decoded stream"
                    );
                    Stream::Decoded(stream)
                }
                Err(error) => {
                    warn!(position, %error, "skipping undecodable stream");
                    Stream::Failed(FailedStream { position, error })
                }
            }
        })
        .collect()
}
