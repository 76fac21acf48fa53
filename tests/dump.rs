// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/dump.rs - End-to-end tests for loading and scanning dump files.
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

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::NamedTempFile;

use gfxlogs::header::{FILETIME_EPOCH_OFFSET_MS, SIGNATURE, SUPPORTED_VERSION};
use gfxlogs::scanner::Stream;
use gfxlogs::source::DumpSource;
use gfxlogs::visitor::sort_by_timestamp;

fn record(opcode: u32, payload: &[u8]) -> Vec<u8> {
    let size = 8 + payload.len() as u32;
    let mut bytes = Vec::new();
    bytes.extend(opcode.to_le_bytes());
    bytes.extend((payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes.extend(size.to_le_bytes());
    bytes
}

fn stream(thread_id: u32, timestamp_ms: u64, data: &[u8]) -> Vec<u8> {
    let ticks = (timestamp_ms + FILETIME_EPOCH_OFFSET_MS) * 10_000;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(SIGNATURE);
    bytes.extend(SUPPORTED_VERSION.to_le_bytes());
    bytes.extend(thread_id.to_le_bytes());
    bytes.extend(ticks.to_le_bytes());
    bytes.extend(0u32.to_le_bytes());
    bytes.extend(0u32.to_le_bytes());
    bytes.extend(7u64.to_le_bytes());
    bytes.extend((data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(data);
    bytes
}

fn sample_dump() -> Vec<u8> {
    let mut dump = b"MDMP\x93\xa7\x00\x00".to_vec();
    dump.extend([0u8; 64]);
    dump.extend(stream(2, 1_700_000_002_000, &record(20, &[1, 2, 3])));
    dump.extend([0u8; 32]);
    dump.extend(stream(1, 1_700_000_001_000, &record(10, &[])));
    // A stray signature with a broken version field.
    dump.extend(b"GFXAPILOG\0\x63\x00");
    dump.extend([0u8; 40]);
    dump
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn summarize(streams: &[Stream]) -> Vec<(u32, Vec<u32>)> {
    streams
        .iter()
        .filter_map(Stream::as_decoded)
        .map(|s| (s.thread_id, s.records.iter().map(|r| r.opcode).collect()))
        .collect()
}

#[test]
fn test_scan_plain_dump() {
    let file = write_temp(&sample_dump());
    let source = DumpSource::from_filename(file.path()).unwrap();
    assert!(source.is_mapped());

    let mut streams = source.scan();
    assert_eq!(streams.len(), 3);
    assert_eq!(summarize(&streams), vec![(2, vec![20]), (1, vec![10])]);
    assert_eq!(
        streams[2].error().map(|e| e.to_string()),
        Some("Unsupported version: 99".to_string())
    );

    sort_by_timestamp(&mut streams);
    assert!(streams[0].error().is_some());
    assert_eq!(summarize(&streams), vec![(1, vec![10]), (2, vec![20])]);

    let newest = streams[2].as_decoded().unwrap();
    assert_eq!(newest.timestamp_ms, 1_700_000_002_000);
    assert_eq!(newest.capture_id, 7);
    assert_eq!(newest.records[0].declared_size, 3);
    assert_eq!(newest.records[0].payload, vec![1, 2, 3]);
}

#[test]
fn test_scan_gzip_dump() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&sample_dump()).unwrap();
    let file = write_temp(&encoder.finish().unwrap());

    let source = DumpSource::from_filename(file.path()).unwrap();
    assert!(!source.is_mapped());
    assert_eq!(source.bytes(), sample_dump().as_slice());
    assert_eq!(summarize(&source.scan()), vec![(2, vec![20]), (1, vec![10])]);
}

#[test]
fn test_empty_dump() {
    let file = write_temp(&[]);
    let source = DumpSource::from_filename(file.path()).unwrap();
    assert!(source.bytes().is_empty());
    assert!(source.scan().is_empty());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(DumpSource::from_filename(dir.path().join("missing.dmp")).is_err());
}
