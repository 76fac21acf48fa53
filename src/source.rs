// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/source.rs - Dump file loader for GfxApiLogger stream scanning.
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

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use flate2::read::{GzDecoder, ZlibDecoder};
use memmap2::Mmap;
use tracing::{debug, warn};

use crate::scanner::{Stream, scan};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug)]
enum Backing {
    Empty,
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// The bytes of a dump file, either mapped in place or inflated into memory
/// when the file is gzip or zlib compressed.
///
/// A mapping is released when the source is dropped.
#[derive(Debug)]
pub struct DumpSource {
    backing: Backing,
}

fn looks_like_zlib(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    if data.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(data).read_to_end(&mut buffer)?;
    } else if looks_like_zlib(data) {
        ZlibDecoder::new(data).read_to_end(&mut buffer)?;
    } else {
        return Err("Not a compressed stream".into());
    }
    Ok(buffer)
}

impl DumpSource {
    /// Opens and maps `filename`, inflating it if it is compressed.
    pub fn from_filename<P: AsRef<Path>>(filename: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = filename.as_ref();
        let file = File::open(path)?;

        if file.metadata()?.len() == 0 {
            debug!(path = %path.display(), "empty dump file");
            return Ok(Self {
                backing: Backing::Empty,
            });
        }

        // SAFETY: The mapping is read-only and the dump is not modified while
        // it is scanned. A concurrent writer truncating the file is outside
        // what this loader supports.
        let mmap = unsafe { Mmap::map(&file)? };
        let backing = match inflate(&mmap) {
            Ok(inflated) => {
                debug!(
                    path = %path.display(),
                    compressed = mmap.len(),
                    inflated = inflated.len(),
                    "inflated compressed dump"
                );
                Backing::Owned(inflated)
            }
            Err(error) => {
                if mmap.starts_with(&GZIP_MAGIC) {
                    warn!(
                        path = %path.display(),
                        %error,
                        "gzip magic found but inflation failed, scanning raw bytes"
                    );
                }
                Backing::Mapped(mmap)
            }
        };

        Ok(Self { backing })
    }

    /// Wraps bytes that are already in memory. Compressed input is inflated
    /// the same way as on-disk files.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let backing = match inflate(&data) {
            Ok(inflated) => Backing::Owned(inflated),
            Err(_) => Backing::Owned(data),
        };
        Self { backing }
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Empty => &[],
            Backing::Mapped(mmap) => &mmap[..],
            Backing::Owned(data) => data.as_slice(),
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    /// Scans the dump for log streams.
    pub fn scan(&self) -> Vec<Stream> {
        scan(self.bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::{GzEncoder, ZlibEncoder};

    use super::*;

    #[test]
    fn test_looks_like_zlib() {
        assert!(looks_like_zlib(&[0x78, 0x9C]));
        assert!(looks_like_zlib(&[0x78, 0x01]));
        assert!(!looks_like_zlib(b"MDMP"));
        assert!(!looks_like_zlib(&[0x78]));
    }

    #[test]
    fn test_inflate() {
        let data = b"GFXAPILOG plus some bytes".repeat(8);

        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(&data).unwrap();
        assert_eq!(inflate(&gz.finish().unwrap()).unwrap(), data);

        let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
        zlib.write_all(&data).unwrap();
        assert_eq!(inflate(&zlib.finish().unwrap()).unwrap(), data);

        assert!(inflate(b"MDMP\x93\xa7").is_err());
    }

    #[test]
    fn test_from_bytes_passes_through_raw_data() {
        let source = DumpSource::from_bytes(b"MDMP raw".to_vec());
        assert_eq!(source.bytes(), b"MDMP raw");
        assert!(!source.is_mapped());
        assert!(source.scan().is_empty());
    }
}
