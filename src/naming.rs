// ROM filename metadata parsing.
//
// Calibration images follow a fixed naming convention:
//
//   {owner}_{car_year}_{car_model}_{MM}_{DD}_{YYYY}[_tune_{NNN}_{description}].{ext}
//
// where `ext` is `bin` (raw binary image) or `hex` (textual interchange
// encoding, accepted but not processed further). A base capture carries no
// tune suffix; a tune carries a 3-digit zero-padded sequence number and a
// free-form description that may itself contain underscores.

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A filename violates the naming grammar. Parsing never silently defaults:
/// every structural deviation maps to a distinct variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing file extension")]
    MissingExtension,
    #[error("unknown extension '{0}' (expected 'bin' or 'hex')")]
    UnknownExtension(String),
    #[error("expected at least 6 underscore-delimited fields, found {found}")]
    TokenCount { found: usize },
    #[error("empty {0} field")]
    EmptyField(&'static str),
    #[error("car year '{0}' is not a 4-digit number")]
    BadCarYear(String),
    #[error("capture {field} '{value}' is not a {width}-digit number")]
    BadDateDigits {
        field: &'static str,
        value: String,
        width: usize,
    },
    #[error("capture {field} {value} is out of range")]
    DateRange { field: &'static str, value: u16 },
    #[error("expected literal 'tune' field, found '{0}'")]
    ExpectedTune(String),
    #[error("tune sequence '{0}' is not a 3-digit zero-padded number")]
    BadSequence(String),
    #[error("missing tune description")]
    MissingDescription,
}

// ---------------------------------------------------------------------------
// File kind
// ---------------------------------------------------------------------------

/// What the file extension says about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.bin` — raw binary calibration image.
    Binary,
    /// `.hex` — textual interchange encoding; catalogued but never diffed.
    Interchange,
}

impl FileKind {
    fn from_extension(ext: &str) -> Result<Self, FormatError> {
        match ext {
            "bin" => Ok(Self::Binary),
            "hex" => Ok(Self::Interchange),
            other => Err(FormatError::UnknownExtension(other.to_string())),
        }
    }

    /// Canonical extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Interchange => "hex",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// Parsed metadata
// ---------------------------------------------------------------------------

/// Tune suffix: sequence number plus description. The grammar ties the two
/// together, so a name either carries both or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneTag {
    /// Sequence number, rendered zero-padded to 3 digits.
    pub sequence: u16,
    /// Free-form description; underscores inside it are preserved.
    pub description: String,
}

/// Metadata decoded from a calibration image filename. Derived once, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomName {
    pub owner: String,
    pub car_year: u16,
    pub car_model: String,
    /// Capture date components (month 1-12, day 1-31; basic range checks
    /// only, not full calendar correctness).
    pub month: u8,
    pub day: u8,
    pub year: u16,
    pub tune: Option<TuneTag>,
    pub kind: FileKind,
}

fn all_digits(s: &str, width: usize) -> bool {
    s.len() == width && s.bytes().all(|b| b.is_ascii_digit())
}

impl RomName {
    /// Parse a bare filename (no directory components) against the grammar.
    pub fn parse(name: &str) -> Result<Self, FormatError> {
        let (stem, ext) = name.rsplit_once('.').ok_or(FormatError::MissingExtension)?;
        let kind = FileKind::from_extension(ext)?;

        let tokens: Vec<&str> = stem.split('_').collect();
        if tokens.len() < 6 {
            return Err(FormatError::TokenCount {
                found: tokens.len(),
            });
        }

        let owner = tokens[0];
        if owner.is_empty() {
            return Err(FormatError::EmptyField("owner"));
        }
        if !all_digits(tokens[1], 4) {
            return Err(FormatError::BadCarYear(tokens[1].to_string()));
        }
        let car_year: u16 = tokens[1]
            .parse()
            .map_err(|_| FormatError::BadCarYear(tokens[1].to_string()))?;
        let car_model = tokens[2];
        if car_model.is_empty() {
            return Err(FormatError::EmptyField("car model"));
        }

        let month = parse_date_field_u8(tokens[3], "month", 1..=12)?;
        let day = parse_date_field_u8(tokens[4], "day", 1..=31)?;
        let year = parse_date_field(tokens[5], "year", 4, 1..=9999)?;

        let tune = match tokens.get(6) {
            None => None,
            Some(&"tune") => {
                let seq = *tokens
                    .get(7)
                    .ok_or_else(|| FormatError::BadSequence(String::new()))?;
                if !all_digits(seq, 3) {
                    return Err(FormatError::BadSequence(seq.to_string()));
                }
                let sequence: u16 = seq
                    .parse()
                    .map_err(|_| FormatError::BadSequence(seq.to_string()))?;
                // Everything after the sequence number is one description
                // unit; rejoin rather than re-split.
                let description = tokens[8..].join("_");
                if description.is_empty() {
                    return Err(FormatError::MissingDescription);
                }
                Some(TuneTag {
                    sequence,
                    description,
                })
            }
            Some(other) => return Err(FormatError::ExpectedTune((*other).to_string())),
        };

        Ok(Self {
            owner: owner.to_string(),
            car_year,
            car_model: car_model.to_string(),
            month,
            day,
            year,
            tune,
            kind,
        })
    }

    /// Format back to the canonical filename. `parse(meta.file_name())`
    /// reproduces `meta` exactly.
    pub fn file_name(&self) -> String {
        let mut name = self.base_stem();
        if let Some(tune) = &self.tune {
            name.push_str(&format!("_tune_{:03}_{}", tune.sequence, tune.description));
        }
        name.push('.');
        name.push_str(self.kind.extension());
        name
    }

    /// The stem shared by a base capture and every tune derived from it.
    pub fn base_stem(&self) -> String {
        format!(
            "{}_{:04}_{}_{:02}_{:02}_{:04}",
            self.owner, self.car_year, self.car_model, self.month, self.day, self.year
        )
    }

    /// Capture date in `YYYY-MM-DD` display form.
    pub fn capture_date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn is_tune(&self) -> bool {
        self.tune.is_some()
    }
}

fn parse_date_field(
    token: &str,
    field: &'static str,
    width: usize,
    range: std::ops::RangeInclusive<u16>,
) -> Result<u16, FormatError> {
    if !all_digits(token, width) {
        return Err(FormatError::BadDateDigits {
            field,
            value: token.to_string(),
            width,
        });
    }
    let value: u16 = token.parse().map_err(|_| FormatError::BadDateDigits {
        field,
        value: token.to_string(),
        width,
    })?;
    if !range.contains(&value) {
        return Err(FormatError::DateRange { field, value });
    }
    Ok(value)
}

// u8-width convenience: month/day are stored narrow.
fn parse_date_field_u8(
    token: &str,
    field: &'static str,
    range: std::ops::RangeInclusive<u16>,
) -> Result<u8, FormatError> {
    parse_date_field(token, field, 2, range).map(|v| v as u8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tune_image() {
        let meta = RomName::parse("bgutch_2003_evo8_11_11_2025_tune_010_wastegateclear.bin")
            .expect("parse failed");
        assert_eq!(meta.owner, "bgutch");
        assert_eq!(meta.car_year, 2003);
        assert_eq!(meta.car_model, "evo8");
        assert_eq!(meta.capture_date(), "2025-11-11");
        let tune = meta.tune.as_ref().expect("tune tag missing");
        assert_eq!(tune.sequence, 10);
        assert_eq!(tune.description, "wastegateclear");
        assert_eq!(meta.kind, FileKind::Binary);
    }

    #[test]
    fn parse_base_image() {
        let meta = RomName::parse("bgutch_2003_evo8_11_11_2025.bin").unwrap();
        assert!(meta.tune.is_none());
        assert!(!meta.is_tune());
        assert_eq!(meta.base_stem(), "bgutch_2003_evo8_11_11_2025");
    }

    #[test]
    fn description_keeps_underscores() {
        let meta = RomName::parse("bgutch_2003_evo8_02_18_2026_tune_001_rpm_limit.hex").unwrap();
        let tune = meta.tune.unwrap();
        assert_eq!(tune.sequence, 1);
        assert_eq!(tune.description, "rpm_limit");
        assert_eq!(meta.kind, FileKind::Interchange);
    }

    #[test]
    fn roundtrip_through_file_name() {
        for name in [
            "bgutch_2003_evo8_11_11_2025.bin",
            "bgutch_2003_evo8_11_11_2025_tune_010_wastegateclear.bin",
            "someone_1999_gsx_01_31_2024_tune_123_a_b_c.hex",
        ] {
            let meta = RomName::parse(name).unwrap();
            assert_eq!(meta.file_name(), name, "roundtrip failed for {name}");
            assert_eq!(RomName::parse(&meta.file_name()).unwrap(), meta);
        }
    }

    #[test]
    fn tune_base_shares_stem() {
        let base = RomName::parse("bgutch_2003_evo8_11_11_2025.bin").unwrap();
        let tune =
            RomName::parse("bgutch_2003_evo8_11_11_2025_tune_002_launchmap.bin").unwrap();
        assert_eq!(base.base_stem(), tune.base_stem());
    }

    #[test]
    fn rejects_short_names() {
        assert_eq!(
            RomName::parse("bgutch_2003_evo8_11_11.bin"),
            Err(FormatError::TokenCount { found: 5 })
        );
    }

    #[test]
    fn rejects_missing_or_unknown_extension() {
        assert_eq!(
            RomName::parse("bgutch_2003_evo8_11_11_2025"),
            Err(FormatError::MissingExtension)
        );
        assert!(matches!(
            RomName::parse("bgutch_2003_evo8_11_11_2025.srf"),
            Err(FormatError::UnknownExtension(_))
        ));
    }

    #[test]
    fn rejects_bad_date_fields() {
        assert!(matches!(
            RomName::parse("bgutch_2003_evo8_1x_11_2025.bin"),
            Err(FormatError::BadDateDigits { field: "month", .. })
        ));
        assert_eq!(
            RomName::parse("bgutch_2003_evo8_13_11_2025.bin"),
            Err(FormatError::DateRange {
                field: "month",
                value: 13
            })
        );
        assert_eq!(
            RomName::parse("bgutch_2003_evo8_11_00_2025.bin"),
            Err(FormatError::DateRange {
                field: "day",
                value: 0
            })
        );
        // Single-digit month is a width violation, not a range violation.
        assert!(matches!(
            RomName::parse("bgutch_2003_evo8_1_11_2025.bin"),
            Err(FormatError::TokenCount { .. }) | Err(FormatError::BadDateDigits { .. })
        ));
    }

    #[test]
    fn rejects_bad_car_year() {
        assert!(matches!(
            RomName::parse("bgutch_03_evo8_11_11_2025.bin"),
            Err(FormatError::BadCarYear(_))
        ));
    }

    #[test]
    fn rejects_malformed_tune_suffix() {
        assert!(matches!(
            RomName::parse("bgutch_2003_evo8_11_11_2025_rev_010_x.bin"),
            Err(FormatError::ExpectedTune(_))
        ));
        assert!(matches!(
            RomName::parse("bgutch_2003_evo8_11_11_2025_tune_10_x.bin"),
            Err(FormatError::BadSequence(_))
        ));
        assert_eq!(
            RomName::parse("bgutch_2003_evo8_11_11_2025_tune_010.bin"),
            Err(FormatError::MissingDescription)
        );
    }
}
