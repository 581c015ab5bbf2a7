// Table layout descriptors.
//
// A definition pins down where a calibration table lives inside an image and
// how its raw cells map to physical values. Definitions are data, not logic:
// new tables are added by declaring a new entry, never by touching the
// extract/diff algorithms.

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A table definition fails its own validation. Raised at registry build
/// time, before any image is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("table '{table}': empty geometry ({rows}x{cols})")]
    EmptyGeometry {
        table: String,
        rows: usize,
        cols: usize,
    },
    #[error("table '{table}': cell width {width} is not 1, 2, or 4")]
    BadCellWidth { table: String, width: usize },
    #[error("table '{table}': {axis} axis has {actual} breakpoint(s), geometry declares {expected}")]
    AxisMismatch {
        table: String,
        axis: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("table '{table}': offset + extent overflows the address space")]
    OffsetOverflow { table: String },
    #[error("table '{table}': scale and bias must be finite")]
    NonFiniteScaling { table: String },
    #[error("duplicate table name '{0}'")]
    Duplicate(String),
}

// ---------------------------------------------------------------------------
// Byte order
// ---------------------------------------------------------------------------

/// Byte order of multi-byte cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Most-significant byte first.
    Big,
    /// Least-significant byte first.
    Little,
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// Layout and scaling descriptor for one named table.
///
/// `offset` is the byte position of the first cell; cells are stored
/// row-major, `cell_width` bytes each, decoded as unsigned integers in
/// `byte_order`. Physical value = `raw * scale + bias` (`bias` is the linear
/// additive offset of the transform, distinct from the byte offset).
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub offset: usize,
    pub rows: usize,
    pub cols: usize,
    pub cell_width: usize,
    pub byte_order: ByteOrder,
    pub scale: f64,
    pub bias: f64,
    /// Axis names, e.g. "RPM" / "Load".
    pub row_label: String,
    pub col_label: String,
    /// Physical breakpoints, one per row / column, in storage order.
    pub row_axis: Vec<f64>,
    pub col_axis: Vec<f64>,
}

impl TableDefinition {
    /// Total byte size of the table region.
    ///
    /// Callers that have not validated the definition should prefer the
    /// checked arithmetic in [`crate::tables::extract`].
    pub fn extent(&self) -> usize {
        self.rows * self.cols * self.cell_width
    }

    /// Check the definition's internal consistency.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(DefinitionError::EmptyGeometry {
                table: self.name.clone(),
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !matches!(self.cell_width, 1 | 2 | 4) {
            return Err(DefinitionError::BadCellWidth {
                table: self.name.clone(),
                width: self.cell_width,
            });
        }
        if self.row_axis.len() != self.rows {
            return Err(DefinitionError::AxisMismatch {
                table: self.name.clone(),
                axis: "row",
                expected: self.rows,
                actual: self.row_axis.len(),
            });
        }
        if self.col_axis.len() != self.cols {
            return Err(DefinitionError::AxisMismatch {
                table: self.name.clone(),
                axis: "column",
                expected: self.cols,
                actual: self.col_axis.len(),
            });
        }
        let extent = self
            .rows
            .checked_mul(self.cols)
            .and_then(|cells| cells.checked_mul(self.cell_width));
        if extent.and_then(|e| e.checked_add(self.offset)).is_none() {
            return Err(DefinitionError::OffsetOverflow {
                table: self.name.clone(),
            });
        }
        if !self.scale.is_finite() || !self.bias.is_finite() {
            return Err(DefinitionError::NonFiniteScaling {
                table: self.name.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
