// Calibration table subsystem: declarative layout definitions, a validated
// registry, extraction of physical values from an image, cell-wise diffing,
// and tabular export.

pub mod definition;
pub mod diff;
pub mod export;
pub mod extract;
pub mod registry;

pub use definition::{ByteOrder, DefinitionError, TableDefinition};
pub use diff::{DEFAULT_TOLERANCE, ShapeMismatchError, TableDelta, diff_tables};
pub use extract::{CalTable, OutOfBoundsError, extract};
pub use registry::{RegistryError, TableRegistry, UnknownTableError};
