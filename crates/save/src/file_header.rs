// ---------------------------------------------------------------------------
// file_header – Zone file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (20 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "ZONE" (0x5A4F4E45)
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4 compressed payload)
//   [12..16] Uncompressed payload size (u32)
//   [16..20] xxHash32 checksum of the stored payload (everything after the header)
//
// On save: encode zone list -> optionally compress -> prepend header
// On load: check magic -> validate checksum -> strip header -> decompress

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a zone file.
pub const MAGIC: [u8; 4] = *b"ZONE";

pub const HEADER_SIZE: usize = 20;

/// Header layout version. Distinct from the zone list version, which tracks
/// the record schema.
pub const HEADER_FORMAT_VERSION: u32 = 1;

pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Wraps an encoded zone list with a header, compressing it with lz4 first
/// when `compress` is set.
pub fn wrap_with_header(data: &[u8], compress: bool) -> Vec<u8> {
    let stored = if compress {
        lz4_flex::compress_prepend_size(data)
    } else {
        data.to_vec()
    };
    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags: if compress { FLAG_COMPRESSED } else { 0 },
        uncompressed_size: data.len() as u32,
        checksum: xxh32(&stored, XXHASH_SEED),
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + stored.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.format_version.to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&header.uncompressed_size.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());
    out.extend_from_slice(&stored);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Validates the header and returns it with the decompressed payload.
///
/// # Errors
///
/// - the magic bytes are missing or the header is truncated
/// - the header comes from a newer build
/// - the checksum does not match
/// - the payload fails to decompress or has the wrong size
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, Vec<u8>), SaveError> {
    if bytes.len() < 4 || bytes[..4] != MAGIC {
        return Err(SaveError::Decode("not a zone file (missing ZONE magic)".into()));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Decode(format!(
            "zone file is too short ({} bytes, need at least {} for header)",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        flags: read_u32(bytes, 8),
        uncompressed_size: read_u32(bytes, 12),
        checksum: read_u32(bytes, 16),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let stored = &bytes[HEADER_SIZE..];
    let computed = xxh32(stored, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::Decode(format!(
            "zone file is corrupted: checksum mismatch (expected {:#010X}, got {:#010X})",
            header.checksum, computed,
        )));
    }

    let payload = if header.is_compressed() {
        lz4_flex::decompress_size_prepended(stored)
            .map_err(|e| SaveError::Decode(format!("lz4: {e}")))?
    } else {
        stored.to_vec()
    };
    if payload.len() != header.uncompressed_size as usize {
        return Err(SaveError::Decode(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            header.uncompressed_size
        )));
    }

    Ok((header, payload))
}
