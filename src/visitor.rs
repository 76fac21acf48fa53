// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/visitor.rs - Record visitor driver for decoded GfxApiLogger streams.
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
 * # `visitor` Module
 *
 * Hands decoded records to an opcode-specific consumer.
 *
 * The library does not know what any opcode means. A consumer implements
 * [RecordVisitor] and keeps whatever state it needs (for example, how many
 * bytes of an enclosing command it is still decoding) in its own fields.
 * [visit_streams] walks every stream, and an error returned (or a panic
 * raised) for one record is logged and collected without stopping the walk.
 *
 * ## Usage Example
 *
 * ```no_run
 * use gfxlogs::record::Record;
 * use gfxlogs::scanner::{scan, DecodedStream};
 * use gfxlogs::visitor::{sort_by_timestamp, visit_streams, RecordVisitor};
 *
 * struct OpcodeCounter(std::collections::HashMap<u32, usize>);
 *
 * impl RecordVisitor for OpcodeCounter {
 *     fn visit_record(
 *         &mut self,
 *         _stream: &DecodedStream,
 *         _index: usize,
 *         record: &Record,
 *     ) -> Result<(), Box<dyn std::error::Error>> {
 *         *self.0.entry(record.opcode).or_default() += 1;
 *         Ok(())
 *     }
 * }
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let blob = std::fs::read("crash.dmp")?;
 *     let mut streams = scan(&blob);
 *     sort_by_timestamp(&mut streams);
 *
 *     let mut counter = OpcodeCounter(Default::default());
 *     let summary = visit_streams(&streams, &mut counter);
 *     println!("{} records, {} failures", summary.visited, summary.failures.len());
 *     Ok(())
 * }
 * ```
 */

use std::any::Any;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::record::Record;
use crate::scanner::{DecodedStream, FailedStream, Stream};

/// A consumer of decoded records.
pub trait RecordVisitor {
    /// Called once before the records of each decoded stream.
    fn begin_stream(&mut self, _stream: &DecodedStream) {}

    /// Called for each record of `stream`, oldest first.
    fn visit_record(
        &mut self,
        stream: &DecodedStream,
        index: usize,
        record: &Record,
    ) -> Result<(), Box<dyn Error>>;

    /// Called for each stream that could not be decoded.
    fn failed_stream(&mut self, _stream: &FailedStream) {}
}

/// A record the visitor rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Position of the owning stream.
    pub position: usize,
    /// Index of the record within its stream.
    pub index: usize,
    pub opcode: u32,
    pub message: String,
}

/// Totals from a [visit_streams] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VisitSummary {
    pub decoded_streams: usize,
    pub failed_streams: usize,
    /// Records handed to the visitor, whether or not it accepted them.
    pub visited: usize,
    pub failures: Vec<RecordFailure>,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Feeds every stream to `visitor` in slice order.
///
/// A record the visitor rejects, either by returning `Err` or by panicking,
/// is logged and added to [VisitSummary::failures], and the walk continues
/// with the next record. The panic hook still runs for a caught panic.
pub fn visit_streams<V: RecordVisitor + ?Sized>(streams: &[Stream], visitor: &mut V) -> VisitSummary {
    let mut summary = VisitSummary::default();

    for stream in streams {
        let decoded = match stream {
            Stream::Decoded(decoded) => decoded,
            Stream::Failed(failed) => {
                summary.failed_streams += 1;
                visitor.failed_stream(failed);
                continue;
            }
        };

        summary.decoded_streams += 1;
        visitor.begin_stream(decoded);

        for (index, record) in decoded.records.iter().enumerate() {
            summary.visited += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                visitor.visit_record(decoded, index, record)
            }));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error.to_string(),
                Err(payload) => format!("visitor panicked: {}", panic_message(payload.as_ref())),
            };

            warn!(
                position = decoded.position,
                index,
                opcode = record.opcode,
                error = %message,
                "failed to interpret record"
            );
            summary.failures.push(RecordFailure {
                position: decoded.position,
                index,
                opcode: record.opcode,
                message,
            });
        }
    }

    summary
}

/// Orders streams for display: failed streams first by position, then decoded
/// streams by last write time. The sort is stable.
pub fn sort_by_timestamp(streams: &mut [Stream]) {
    streams.sort_by_key(|stream| match stream {
        Stream::Failed(failed) => (0, failed.position as u64),
        Stream::Decoded(decoded) => (1, decoded.timestamp_ms),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HeaderError, StreamError};

    fn decoded(position: usize, timestamp_ms: u64, opcodes: &[u32]) -> Stream {
        Stream::Decoded(DecodedStream {
            position,
            timestamp_ms,
            thread_id: 1,
            capture_id: 2,
            write_index: 0,
            records: opcodes
                .iter()
                .map(|&opcode| Record {
                    opcode,
                    declared_size: 0,
                    payload: vec![],
                })
                .collect(),
        })
    }

    fn failed(position: usize) -> Stream {
        Stream::Failed(FailedStream {
            position,
            error: StreamError::Header(HeaderError::SignatureMismatch),
        })
    }

    /// Rejects two opcodes and tracks a nested region across records.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(usize, u32)>,
        streams_begun: usize,
        failed_positions: Vec<usize>,
        nested_remaining: u32,
    }

    impl RecordVisitor for Recorder {
        fn begin_stream(&mut self, _stream: &DecodedStream) {
            self.streams_begun += 1;
            self.nested_remaining = 0;
        }

        fn visit_record(
            &mut self,
            stream: &DecodedStream,
            _index: usize,
            record: &Record,
        ) -> Result<(), Box<dyn Error>> {
            self.seen.push((stream.position, record.opcode));
            if record.opcode == 0xBAD {
                return Err(format!("cannot interpret opcode {:#x}", record.opcode).into());
            }
            if record.opcode == 0xDEAD {
                panic!("opcode {:#x} has no handler", record.opcode);
            }
            if record.opcode == 100 {
                self.nested_remaining = 2;
            } else {
                self.nested_remaining = self.nested_remaining.saturating_sub(1);
            }
            Ok(())
        }

        fn failed_stream(&mut self, stream: &FailedStream) {
            self.failed_positions.push(stream.position);
        }
    }

    #[test]
    fn test_failures_do_not_stop_visiting() {
        let streams = vec![
            decoded(0, 10, &[1, 0xBAD, 2]),
            failed(50),
            decoded(100, 20, &[0xBAD, 3]),
        ];
        let mut recorder = Recorder::default();
        let summary = visit_streams(&streams, &mut recorder);

        assert_eq!(
            recorder.seen,
            vec![(0, 1), (0, 0xBAD), (0, 2), (100, 0xBAD), (100, 3)]
        );
        assert_eq!(recorder.streams_begun, 2);
        assert_eq!(recorder.failed_positions, vec![50]);

        assert_eq!(summary.decoded_streams, 2);
        assert_eq!(summary.failed_streams, 1);
        assert_eq!(summary.visited, 5);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.failures[0].position, 0);
        assert_eq!(summary.failures[0].index, 1);
        assert_eq!(summary.failures[1].position, 100);
        assert_eq!(summary.failures[1].index, 0);
        assert_eq!(summary.failures[1].message, "cannot interpret opcode 0xbad");
    }

    #[test]
    fn test_panicking_visitor_does_not_stop_visiting() {
        let streams = vec![decoded(0, 10, &[1, 0xDEAD, 2]), decoded(40, 20, &[3])];
        let mut recorder = Recorder::default();
        let summary = visit_streams(&streams, &mut recorder);

        assert_eq!(recorder.seen, vec![(0, 1), (0, 0xDEAD), (0, 2), (40, 3)]);
        assert_eq!(summary.visited, 4);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].index, 1);
        assert_eq!(summary.failures[0].opcode, 0xDEAD);
        assert_eq!(
            summary.failures[0].message,
            "visitor panicked: opcode 0xdead has no handler"
        );
    }

    #[test]
    fn test_visitor_state_resets_per_stream() {
        let streams = vec![decoded(0, 0, &[100]), decoded(10, 0, &[4])];
        let mut recorder = Recorder::default();
        visit_streams(&streams, &mut recorder);
        assert_eq!(recorder.nested_remaining, 0);
    }

    #[test]
    fn test_sort_by_timestamp() {
        let mut streams = vec![
            decoded(0, 300, &[]),
            failed(90),
            decoded(10, 100, &[]),
            failed(40),
            decoded(20, 100, &[]),
        ];
        sort_by_timestamp(&mut streams);

        let positions: Vec<usize> = streams.iter().map(Stream::position).collect();
        assert_eq!(positions, vec![40, 90, 10, 20, 0]);
    }
}
