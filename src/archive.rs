//! Store-only ZIP archive writer
//!
//! Entries are written uncompressed (method 0), each protected by a CRC-32. The
//! layout is: every local header immediately followed by its data, then one
//! central directory record per entry in the same order, then the end of
//! central directory record. No ZIP64 extensions, so an archive holds at most
//! 65535 entries and every size and offset must fit in 32 bits.

use crate::error::{Error, Result};
use crate::types::Artifact;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;

const VERSION: u16 = 20;
const METHOD_STORE: u16 = 0;
/// MS-DOS date for 1980-01-01, the earliest representable; time is midnight
const DOS_DATE: u16 = (1 << 5) | 1;
const DOS_TIME: u16 = 0;

const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_OF_CENTRAL_DIR_LEN: usize = 22;

/// Reflected IEEE 802.3 polynomial
const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

static CRC32_TABLE: [u32; 256] = crc32_table();

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                CRC32_POLYNOMIAL ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// CRC-32 (IEEE) of `data`
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFFu32, |crc, &byte| {
        CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    crc ^ 0xFFFF_FFFF
}

struct ArchiveEntry<'a> {
    name: &'a [u8],
    data: &'a [u8],
    crc32: u32,
    local_header_offset: u32,
}

/// Serialize `entries` into a store-only ZIP archive
///
/// Entry order is preserved. Fails with [`Error::Archive`] if the archive would
/// need ZIP64 (too many entries, or a size/offset beyond 4 GiB).
pub fn build(entries: &[Artifact]) -> Result<Vec<u8>> {
    let count = u16::try_from(entries.len()).map_err(|_| {
        Error::Archive(format!(
            "{} entries exceed the 65535 entry limit",
            entries.len()
        ))
    })?;

    let mut out = Vec::with_capacity(
        entries
            .iter()
            .map(|e| LOCAL_HEADER_LEN + CENTRAL_HEADER_LEN + 2 * e.filename.len() + e.bytes.len())
            .sum::<usize>()
            + END_OF_CENTRAL_DIR_LEN,
    );
    let mut written = Vec::with_capacity(entries.len());

    for artifact in entries {
        let entry = ArchiveEntry {
            name: artifact.filename.as_bytes(),
            data: &artifact.bytes,
            crc32: crc32(&artifact.bytes),
            local_header_offset: to_u32(out.len(), "local header offset")?,
        };
        let size = to_u32(entry.data.len(), "entry size")?;
        let name_len = to_u16(entry.name.len(), "entry name length")?;

        put_u32(&mut out, LOCAL_HEADER_SIGNATURE);
        put_u16(&mut out, VERSION);
        put_u16(&mut out, 0); // flags
        put_u16(&mut out, METHOD_STORE);
        put_u16(&mut out, DOS_TIME);
        put_u16(&mut out, DOS_DATE);
        put_u32(&mut out, entry.crc32);
        put_u32(&mut out, size); // compressed
        put_u32(&mut out, size); // uncompressed
        put_u16(&mut out, name_len);
        put_u16(&mut out, 0); // extra field length
        out.extend_from_slice(entry.name);
        out.extend_from_slice(entry.data);

        written.push(entry);
    }

    let central_dir_offset = to_u32(out.len(), "central directory offset")?;

    for entry in &written {
        let size = entry.data.len() as u32;

        put_u32(&mut out, CENTRAL_HEADER_SIGNATURE);
        put_u16(&mut out, VERSION); // made by
        put_u16(&mut out, VERSION); // needed to extract
        put_u16(&mut out, 0); // flags
        put_u16(&mut out, METHOD_STORE);
        put_u16(&mut out, DOS_TIME);
        put_u16(&mut out, DOS_DATE);
        put_u32(&mut out, entry.crc32);
        put_u32(&mut out, size);
        put_u32(&mut out, size);
        put_u16(&mut out, entry.name.len() as u16);
        put_u16(&mut out, 0); // extra field length
        put_u16(&mut out, 0); // comment length
        put_u16(&mut out, 0); // disk number start
        put_u16(&mut out, 0); // internal attributes
        put_u32(&mut out, 0); // external attributes
        put_u32(&mut out, entry.local_header_offset);
        out.extend_from_slice(entry.name);
    }

    let central_dir_size = to_u32(
        out.len() - central_dir_offset as usize,
        "central directory size",
    )?;

    put_u32(&mut out, END_OF_CENTRAL_DIR_SIGNATURE);
    put_u16(&mut out, 0); // this disk
    put_u16(&mut out, 0); // disk with central directory
    put_u16(&mut out, count); // entries on this disk
    put_u16(&mut out, count); // entries total
    put_u32(&mut out, central_dir_size);
    put_u32(&mut out, central_dir_offset);
    put_u16(&mut out, 0); // comment length

    Ok(out)
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Archive(format!("{} {} exceeds 4 GiB", what, value)))
}

fn to_u16(value: usize, what: &str) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::Archive(format!("{} {} exceeds 65535", what, value)))
}
