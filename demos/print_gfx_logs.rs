// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  print_gfx_logs.rs - GfxApiLogger stream dump tool for crash dumps.
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

use std::error::Error;
use std::io;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gfxlogs::record::Record;
use gfxlogs::scanner::{DecodedStream, FailedStream};
use gfxlogs::source::DumpSource;
use gfxlogs::visitor::*;

const PREVIEW_BYTES: usize = 16;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The dump file to read.
    file: String,

    /// Write one CSV row per record instead of text.
    #[arg(long)]
    csv: bool,
}

fn format_timestamp(timestamp_ms: u64) -> String {
    // Zero means the logger's clock predates 1970, so treat it as unknown.
    if timestamp_ms == 0 {
        return "unknown".to_string();
    }
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| format!("{} ms", timestamp_ms))
}

fn hex_preview(payload: &[u8]) -> String {
    let mut preview = payload
        .iter()
        .take(PREVIEW_BYTES)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    if payload.len() > PREVIEW_BYTES {
        preview.push_str(" ...");
    }
    preview
}

struct TextPrinter;

impl RecordVisitor for TextPrinter {
    fn begin_stream(&mut self, stream: &DecodedStream) {
        println!(
            "=== Stream at {:#x}: {}, thread {}, capture {}, write index {}, {} records",
            stream.position,
            format_timestamp(stream.timestamp_ms),
            stream.thread_id,
            stream.capture_id,
            stream.write_index,
            stream.records.len()
        );
    }

    fn visit_record(
        &mut self,
        _stream: &DecodedStream,
        index: usize,
        record: &Record,
    ) -> Result<(), Box<dyn Error>> {
        println!(
            "  [{:5}] opcode {:#010x}  declared {:6}  payload {:6}  {}",
            index,
            record.opcode,
            record.declared_size,
            record.payload.len(),
            hex_preview(&record.payload)
        );
        Ok(())
    }

    fn failed_stream(&mut self, stream: &FailedStream) {
        println!(
            "=== Stream at {:#x}: failed to decode: {}",
            stream.position, stream.error
        );
    }
}

struct CsvPrinter<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> RecordVisitor for CsvPrinter<W> {
    fn visit_record(
        &mut self,
        stream: &DecodedStream,
        index: usize,
        record: &Record,
    ) -> Result<(), Box<dyn Error>> {
        self.writer.write_record([
            stream.position.to_string(),
            stream.capture_id.to_string(),
            stream.thread_id.to_string(),
            stream.timestamp_ms.to_string(),
            index.to_string(),
            record.opcode.to_string(),
            record.declared_size.to_string(),
            record.payload.len().to_string(),
        ])?;
        Ok(())
    }

    fn failed_stream(&mut self, stream: &FailedStream) {
        eprintln!(
            "Stream at {:#x} failed to decode: {}",
            stream.position, stream.error
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let source = match DumpSource::from_filename(&args.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    let mut streams = source.scan();
    sort_by_timestamp(&mut streams);

    let summary = if args.csv {
        let mut writer = csv::Writer::from_writer(io::stdout());
        if let Err(error) = writer.write_record([
            "position",
            "capture_id",
            "thread_id",
            "timestamp_ms",
            "index",
            "opcode",
            "declared_size",
            "payload_len",
        ]) {
            eprintln!("Failed to write CSV header: {}", error);
            return;
        }
        let mut printer = CsvPrinter { writer };
        let summary = visit_streams(&streams, &mut printer);
        if let Err(error) = printer.writer.flush() {
            eprintln!("Failed to flush CSV output: {}", error);
        }
        summary
    } else {
        visit_streams(&streams, &mut TextPrinter)
    };

    for failure in &summary.failures {
        eprintln!(
            "Failed to print record {} (opcode {:#x}) of stream at {:#x}: {}",
            failure.index, failure.opcode, failure.position, failure.message
        );
    }

    eprintln!(
        "{} streams decoded, {} failed, {} records",
        summary.decoded_streams, summary.failed_streams, summary.visited
    );
}
