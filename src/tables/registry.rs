// Validated table catalog.
//
// Built once at startup from the builtin defaults or a JSON catalog file,
// then treated as read-only and passed by reference into extract/diff call
// sites. Every entry is validated before any image is touched.
//
// Catalog file format (a JSON object keyed by table name):
//
//   {
//     "octane": {
//       "offset": 12288,
//       "rows": 16,
//       "cols": 16,
//       "row_label": "RPM",
//       "col_label": "Load",
//       "row_axis": [500.0, 1000.0, ...],
//       "col_axis": [20.0, 30.0, ...]
//     }
//   }
//
// `cell_width` (default 1), `byte_order` ("big"/"little", default "big"),
// `scale` (default 1.0) and `bias` (default 0.0) are optional. When an axis
// is omitted its breakpoints default to 0-based indices.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::tables::definition::{ByteOrder, DefinitionError, TableDefinition};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Requested table name absent from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table '{name}' (available: {})", .available.join(", "))]
pub struct UnknownTableError {
    pub name: String,
    pub available: Vec<String>,
}

/// Failure to build a registry from a catalog file.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

// ---------------------------------------------------------------------------
// JSON catalog shape
// ---------------------------------------------------------------------------

fn default_cell_width() -> usize {
    1
}

fn default_byte_order() -> ByteOrder {
    ByteOrder::Big
}

fn default_scale() -> f64 {
    1.0
}

fn default_row_label() -> String {
    "Row".to_string()
}

fn default_col_label() -> String {
    "Col".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    offset: usize,
    rows: usize,
    cols: usize,
    #[serde(default = "default_cell_width")]
    cell_width: usize,
    #[serde(default = "default_byte_order")]
    byte_order: ByteOrder,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default)]
    bias: f64,
    #[serde(default = "default_row_label")]
    row_label: String,
    #[serde(default = "default_col_label")]
    col_label: String,
    #[serde(default)]
    row_axis: Option<Vec<f64>>,
    #[serde(default)]
    col_axis: Option<Vec<f64>>,
}

fn index_axis(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64).collect()
}

impl RawTable {
    fn into_definition(self, name: String) -> TableDefinition {
        let row_axis = self.row_axis.unwrap_or_else(|| index_axis(self.rows));
        let col_axis = self.col_axis.unwrap_or_else(|| index_axis(self.cols));
        TableDefinition {
            name,
            offset: self.offset,
            rows: self.rows,
            cols: self.cols,
            cell_width: self.cell_width,
            byte_order: self.byte_order,
            scale: self.scale,
            bias: self.bias,
            row_label: self.row_label,
            col_label: self.col_label,
            row_axis,
            col_axis,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only catalog mapping table names to validated definitions.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    tables: BTreeMap<String, TableDefinition>,
}

impl TableRegistry {
    /// Build a registry from definitions, validating each entry. Fails fast
    /// on the first invalid or duplicated entry.
    pub fn from_definitions(
        defs: impl IntoIterator<Item = TableDefinition>,
    ) -> Result<Self, DefinitionError> {
        let mut tables = BTreeMap::new();
        for def in defs {
            def.validate()?;
            let name = def.name.clone();
            if tables.insert(name.clone(), def).is_some() {
                return Err(DefinitionError::Duplicate(name));
            }
        }
        Ok(Self { tables })
    }

    /// Parse and validate a JSON catalog.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let raw: BTreeMap<String, RawTable> = serde_json::from_str(json)?;
        let defs = raw
            .into_iter()
            .map(|(name, table)| table.into_definition(name));
        Ok(Self::from_definitions(defs)?)
    }

    /// Load and validate a JSON catalog file.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading table catalog from {}", path.display());
        Self::from_json_str(&text)
    }

    /// The stock 4G63 catalog: octane and ignition maps, 16x16 single-byte
    /// cells over an RPM/Load grid.
    pub fn builtin() -> Self {
        let rpm_axis: Vec<f64> = (1..=16).map(|i| i as f64 * 500.0).collect();
        let load_axis: Vec<f64> = (0..16).map(|i| 20.0 + i as f64 * 10.0).collect();

        let octane = TableDefinition {
            name: "octane".to_string(),
            offset: 0x3000,
            rows: 16,
            cols: 16,
            cell_width: 1,
            byte_order: ByteOrder::Big,
            scale: 0.5,
            bias: 0.0,
            row_label: "RPM".to_string(),
            col_label: "Load".to_string(),
            row_axis: rpm_axis.clone(),
            col_axis: load_axis.clone(),
        };
        let ignition = TableDefinition {
            name: "ignition".to_string(),
            offset: 0x4000,
            rows: 16,
            cols: 16,
            cell_width: 1,
            byte_order: ByteOrder::Big,
            scale: 1.0,
            bias: -20.0,
            row_label: "RPM".to_string(),
            col_label: "Load".to_string(),
            row_axis: rpm_axis,
            col_axis: load_axis,
        };

        Self::from_definitions([octane, ignition]).expect("builtin table catalog is valid")
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Result<&TableDefinition, UnknownTableError> {
        self.tables.get(name).ok_or_else(|| UnknownTableError {
            name: name.to_string(),
            available: self.tables.keys().cloned().collect(),
        })
    }

    /// Table names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
