//! Romcal: ECU calibration ROM introspection.
//!
//! The crate provides:
//! - Filename metadata parsing for the capture/tune naming convention (`naming`)
//! - Verbatim image loading (`image`)
//! - Exact byte-level deltas between two images (`bytediff`)
//! - A validated calibration table catalog plus extraction, diffing and
//!   export of named tables (`tables`)
//! - Two optional CLI tools, `romcat` and `romtab` (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use romcal::image::RomImage;
//! use romcal::tables::{DEFAULT_TOLERANCE, TableRegistry, diff_tables, extract};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TableRegistry::builtin();
//! let def = registry.get("ignition")?;
//!
//! let base = RomImage::load(Path::new("base.bin"))?;
//! let tune = RomImage::load(Path::new("tune.bin"))?;
//!
//! let before = extract(base.as_bytes(), def)?;
//! let after = extract(tune.as_bytes(), def)?;
//! let delta = diff_tables(&before, &after, DEFAULT_TOLERANCE)?;
//! println!("{} cell(s) changed", delta.changed);
//! # Ok(())
//! # }
//! ```

pub mod bytediff;
pub mod image;
pub mod naming;
pub mod tables;

#[cfg(feature = "cli")]
pub mod cli;
