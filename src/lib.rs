// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Decoder library for GfxApiLogger streams in crash dumps.
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
 * # `gfxlogs` Crate
 *
 * A library for extracting GfxApiLogger command logs from crash dumps.
 *
 * A graphics API interception layer keeps a per-thread ring buffer of recent
 * commands, and those buffers end up inside minidumps when the process
 * crashes. This crate finds and decodes them:
 *
 * 1. [source]: Maps the dump file, inflating it first if it is compressed.
 * 2. [scanner]: Finds every stream signature and decodes each stream using
 *    [header], [ring], and [record].
 * 3. [visitor]: Hands the decoded records to an opcode-specific consumer.
 *
 * ## Usage Example
 *
 * ```no_run
 * use gfxlogs::scanner::Stream;
 * use gfxlogs::source::DumpSource;
 * use gfxlogs::visitor::sort_by_timestamp;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Open the dump
 *     let source = DumpSource::from_filename("crash.dmp")?;
 *
 *     // Find and decode every stream
 *     let mut streams = source.scan();
 *     sort_by_timestamp(&mut streams);
 *
 *     for stream in &streams {
 *         match stream {
 *             Stream::Decoded(s) => {
 *                 println!("Thread {} at {} ms", s.thread_id, s.timestamp_ms);
 *                 for record in &s.records {
 *                     println!("  Opcode: {} ({} bytes)", record.opcode, record.payload.len());
 *                 }
 *             }
 *             Stream::Failed(s) => println!("Stream at {}: {}", s.position, s.error),
 *         }
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod error;
pub mod header;
pub mod reader;
pub mod record;
pub mod ring;
pub mod scanner;
pub mod source;
pub mod visitor;
