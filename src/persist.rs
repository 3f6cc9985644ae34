//! On-disk layout of a pruning table set.
//!
//! A file is an 8-byte magic, a little-endian u32 version, a little-endian
//! u32 table count, then per table: u32 entry count, u32 coordinate-product
//! identifier, and ceil(count/2) bytes of nibble data, low nibble first.
//! Loaders verify every field before accepting the payload.

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::pruning::NibbleTable;

pub const KOCIEMBA_MAGIC: [u8; 8] = *b"KOCIEMB\0";
pub const KROF_MAGIC: [u8; 8] = *b"KROFTBL\0";
pub const FORMAT_VERSION: u32 = 1;

/// Coordinate-product identifiers of the table records.
pub const TABLE_PHASE1_TWIST: u32 = 1;
pub const TABLE_PHASE1_FLIPSLICE: u32 = 2;
pub const TABLE_PHASE2_CORNSLICE: u32 = 3;
pub const TABLE_PHASE2_EDGESLICE: u32 = 4;
pub const TABLE_KROF_CORNERS: u32 = 5;
pub const TABLE_KROF_FIRST_EDGES: u32 = 6;
pub const TABLE_KROF_LAST_EDGES: u32 = 7;

/// Expected identifier and entry count of one record in a table file.
pub struct TableSpec {
    pub ident: u32,
    pub len: usize,
}

/// Serialize a table set to `path` in the documented layout.
pub fn save_tables(path: &Path, magic: &[u8; 8], tables: &[(u32, &NibbleTable)]) -> Result<(), Error> {
    let payload: usize = tables.iter().map(|(_, t)| 8 + t.raw().len()).sum();
    let mut buf = Vec::with_capacity(16 + payload);
    buf.extend_from_slice(magic);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&(tables.len() as u32).to_le_bytes());
    for (ident, table) in tables {
        buf.extend_from_slice(&(table.len() as u32).to_le_bytes());
        buf.extend_from_slice(&ident.to_le_bytes());
        buf.extend_from_slice(table.raw());
    }
    fs::write(path, buf).map_err(|e| Error::TableSave(format!("{}: {e}", path.display())))
}

/// Load and verify a table set written by [`save_tables`].
///
/// The records must appear in the order given by `layout`; any magic,
/// version, count, identifier or length mismatch is rejected, as are
/// truncated files and trailing bytes.
pub fn load_tables(path: &Path, magic: &[u8; 8], layout: &[TableSpec]) -> Result<Vec<NibbleTable>, Error> {
    let bytes =
        fs::read(path).map_err(|e| Error::TableLoad(format!("{}: {e}", path.display())))?;
    let mut pos = 0;

    let file_magic = take(&bytes, &mut pos, 8)?;
    if file_magic != magic {
        return Err(Error::TableLoad("magic mismatch".into()));
    }
    let version = read_u32(&bytes, &mut pos)?;
    if version != FORMAT_VERSION {
        return Err(Error::TableLoad(format!("unknown version {version}")));
    }
    let count = read_u32(&bytes, &mut pos)? as usize;
    if count != layout.len() {
        return Err(Error::TableLoad(format!(
            "expected {} tables, found {count}",
            layout.len()
        )));
    }

    let mut tables = Vec::with_capacity(count);
    for spec in layout {
        let len = read_u32(&bytes, &mut pos)? as usize;
        let ident = read_u32(&bytes, &mut pos)?;
        if ident != spec.ident || len != spec.len {
            return Err(Error::TableLoad(format!(
                "unrecognized table record (ident {ident}, {len} entries)"
            )));
        }
        let data = take(&bytes, &mut pos, (len + 1) / 2)?;
        tables.push(NibbleTable::from_raw(len, data.to_vec()));
    }
    if pos != bytes.len() {
        return Err(Error::TableLoad(format!(
            "{} trailing bytes",
            bytes.len() - pos
        )));
    }
    Ok(tables)
}

fn take<'a>(bytes: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8], Error> {
    if bytes.len() - *pos < n {
        return Err(Error::TableLoad("truncated file".into()));
    }
    let slice = &bytes[*pos..*pos + n];
    *pos += n;
    Ok(slice)
}

fn read_u32(bytes: &[u8], pos: &mut usize) -> Result<u32, Error> {
    let b = take(bytes, pos, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
