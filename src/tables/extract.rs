// Table extraction: image bytes -> physical value matrix.
//
// Bounds are validated per call against the actual image length; a region
// that does not fit fails, never truncates. Extraction is a pure function of
// (image, definition) and is bit-for-bit reproducible.

use thiserror::Error;

use crate::tables::definition::{ByteOrder, TableDefinition};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The table region exceeds the image length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "table '{table}' region [0x{offset:X}, 0x{offset:X}+{extent}) exceeds image length {image_len}"
)]
pub struct OutOfBoundsError {
    pub table: String,
    pub offset: usize,
    pub extent: usize,
    pub image_len: usize,
}

// ---------------------------------------------------------------------------
// Extracted table
// ---------------------------------------------------------------------------

/// A materialized table: axis metadata copied from the definition plus a
/// row-major matrix of physical values. Holds no reference to the source
/// buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CalTable {
    pub name: String,
    pub row_label: String,
    pub col_label: String,
    pub row_axis: Vec<f64>,
    pub col_axis: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

impl CalTable {
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    pub fn cols(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Read `def`'s table out of `image`, applying the linear scaling transform.
pub fn extract(image: &[u8], def: &TableDefinition) -> Result<CalTable, OutOfBoundsError> {
    let extent = def
        .rows
        .saturating_mul(def.cols)
        .saturating_mul(def.cell_width);
    let fits = def
        .offset
        .checked_add(extent)
        .is_some_and(|end| end <= image.len());
    if !fits {
        return Err(OutOfBoundsError {
            table: def.name.clone(),
            offset: def.offset,
            extent,
            image_len: image.len(),
        });
    }

    let mut values = Vec::with_capacity(def.rows);
    let mut pos = def.offset;
    for _ in 0..def.rows {
        let mut row = Vec::with_capacity(def.cols);
        for _ in 0..def.cols {
            let raw = decode_cell(&image[pos..pos + def.cell_width], def.byte_order);
            row.push(raw as f64 * def.scale + def.bias);
            pos += def.cell_width;
        }
        values.push(row);
    }

    Ok(CalTable {
        name: def.name.clone(),
        row_label: def.row_label.clone(),
        col_label: def.col_label.clone(),
        row_axis: def.row_axis.clone(),
        col_axis: def.col_axis.clone(),
        values,
    })
}

/// Decode an unsigned cell of 1, 2 or 4 bytes in the given byte order.
fn decode_cell(bytes: &[u8], order: ByteOrder) -> u64 {
    match order {
        ByteOrder::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        ByteOrder::Little => bytes
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn def(offset: usize, rows: usize, cols: usize, cell_width: usize) -> TableDefinition {
        TableDefinition {
            name: "test".to_string(),
            offset,
            rows,
            cols,
            cell_width,
            byte_order: ByteOrder::Big,
            scale: 1.0,
            bias: 0.0,
            row_label: "RPM".to_string(),
            col_label: "Load".to_string(),
            row_axis: (0..rows).map(|i| i as f64).collect(),
            col_axis: (0..cols).map(|i| i as f64).collect(),
        }
    }

    #[test]
    fn zero_buffer_extracts_to_zero_matrix() {
        let image = vec![0u8; 512];
        let table = extract(&image, &def(0x10, 2, 2, 1)).unwrap();
        assert_eq!(table.values, vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn reads_row_major_from_offset() {
        let mut image = vec![0u8; 64];
        image[8..12].copy_from_slice(&[1, 2, 3, 4]);
        let table = extract(&image, &def(8, 2, 2, 1)).unwrap();
        assert_eq!(table.values, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn decodes_wide_cells_in_both_byte_orders() {
        let image = [0x01, 0x02, 0x03, 0x04];

        let mut big = def(0, 1, 2, 2);
        big.byte_order = ByteOrder::Big;
        let table = extract(&image, &big).unwrap();
        assert_eq!(table.values, vec![vec![0x0102 as f64, 0x0304 as f64]]);

        let mut little = def(0, 1, 2, 2);
        little.byte_order = ByteOrder::Little;
        let table = extract(&image, &little).unwrap();
        assert_eq!(table.values, vec![vec![0x0201 as f64, 0x0403 as f64]]);
    }

    #[test]
    fn four_byte_cells_decode() {
        let image = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut d = def(0, 1, 1, 4);
        d.byte_order = ByteOrder::Big;
        let table = extract(&image, &d).unwrap();
        assert_eq!(table.values[0][0], 0xDEADBEEFu32 as f64);
    }

    #[test]
    fn applies_scale_and_bias() {
        let image = [10u8, 20, 30, 40];
        let mut d = def(0, 2, 2, 1);
        d.scale = 0.5;
        d.bias = -5.0;
        let table = extract(&image, &d).unwrap();
        assert_eq!(table.values, vec![vec![0.0, 5.0], vec![10.0, 15.0]]);
    }

    #[test]
    fn region_beyond_image_fails() {
        let image = [0u8; 4];
        let err = extract(&image, &def(0x10000, 2, 2, 1)).unwrap_err();
        assert_eq!(err.offset, 0x10000);
        assert_eq!(err.extent, 4);
        assert_eq!(err.image_len, 4);
    }

    #[test]
    fn region_ending_exactly_at_image_end_succeeds() {
        let image = [7u8; 16];
        let table = extract(&image, &def(12, 2, 2, 1)).unwrap();
        assert_eq!(table.rows(), 2);
        assert!(extract(&image, &def(13, 2, 2, 1)).is_err());
    }

    #[test]
    fn extraction_is_deterministic() {
        let image: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        let d = def(0x40, 4, 8, 2);
        let a = extract(&image, &d).unwrap();
        let b = extract(&image, &d).unwrap();
        assert_eq!(a, b);
    }
}
