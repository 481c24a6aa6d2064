//! Minimal `.npy` (NumPy array format, version 1.0) reader/writer for
//! float32 matrices. No crate in the dependency graph speaks this narrow
//! binary interop format, so it is implemented directly rather than faked.

use crate::ontology::error::OntologyError;
use std::io::{Read, Write};

const MAGIC: &[u8] = b"\x93NUMPY";

/// Writes `rows` (each of length `cols`) as a row-major float32 `.npy` array.
pub fn write_f32_matrix<W: Write>(
    mut writer: W,
    rows: &[Vec<f32>],
    cols: usize,
) -> Result<(), OntologyError> {
    let header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows.len(),
        cols
    );
    let unpadded_len = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padded_total = unpadded_len.div_ceil(64) * 64;
    let pad = padded_total - unpadded_len;
    let mut header_line = header;
    header_line.push_str(&" ".repeat(pad));
    header_line.push('\n');

    writer.write_all(MAGIC)?;
    writer.write_all(&[1u8, 0u8])?;
    writer.write_all(&(header_line.len() as u16).to_le_bytes())?;
    writer.write_all(header_line.as_bytes())?;

    for row in rows {
        debug_assert_eq!(row.len(), cols);
        for value in row {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Reads back a float32 `.npy` array written by [`write_f32_matrix`].
pub fn read_f32_matrix<R: Read>(mut reader: R) -> Result<(Vec<Vec<f32>>, usize), OntologyError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(corrupt("bad magic header"));
    }
    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;

    let mut header_len_bytes = [0u8; 2];
    reader.read_exact(&mut header_len_bytes)?;
    let header_len = u16::from_le_bytes(header_len_bytes) as usize;

    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let header = String::from_utf8_lossy(&header_bytes);

    let shape = parse_shape(&header)?;
    let (n_rows, n_cols) = shape;

    let mut rows = Vec::with_capacity(n_rows);
    let mut buf = [0u8; 4];
    for _ in 0..n_rows {
        let mut row = Vec::with_capacity(n_cols);
        for _ in 0..n_cols {
            reader.read_exact(&mut buf)?;
            row.push(f32::from_le_bytes(buf));
        }
        rows.push(row);
    }
    Ok((rows, n_cols))
}

fn parse_shape(header: &str) -> Result<(usize, usize), OntologyError> {
    let start = header
        .find("'shape':")
        .ok_or_else(|| corrupt("missing shape in npy header"))?;
    let paren_start = header[start..]
        .find('(')
        .ok_or_else(|| corrupt("missing shape tuple"))?
        + start;
    let paren_end = header[paren_start..]
        .find(')')
        .ok_or_else(|| corrupt("unterminated shape tuple"))?
        + paren_start;
    let inner = &header[paren_start + 1..paren_end];
    let parts: Vec<usize> = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| corrupt("non-numeric shape entry"))?;
    match parts.as_slice() {
        [rows, cols] => Ok((*rows, *cols)),
        [rows] => Ok((*rows, 1)),
        _ => Err(corrupt("unsupported shape rank")),
    }
}

fn corrupt(reason: &str) -> OntologyError {
    OntologyError::VectorIndexCorrupt {
        ontology: "<npy>".to_string(),
        model_id: "<npy>".to_string(),
        reason: reason.to_string(),
    }
}
