use crate::{
    parser::{line1_fields, line2_catalog_number},
    ELEMENT_LINE_LEN, RELIABLE_PREDICTION_HORIZON_DAYS,
};
use chrono::{Duration, NaiveDate};
use std::fmt;
use tracing::debug;
use track_types::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElementSetError {
    #[error("No element set named '{0}' in the catalog")]
    NotFound(String),
    #[error("Element set for '{0}' is truncated")]
    Incomplete(String),
    #[error("Element line {line} is {len} characters long, expected {ELEMENT_LINE_LEN}")]
    LineLength { line: u8, len: usize },
    #[error("Element line {line} does not start with its line number")]
    LineNumber { line: u8 },
    #[error("Element line {line} checksum mismatch (recorded {recorded}, computed {computed})")]
    Checksum { line: u8, recorded: u32, computed: u32 },
    #[error("Element line {line} is malformed")]
    Malformed { line: u8 },
    #[error("Element lines describe different objects ('{line1}' vs '{line2}')")]
    CatalogNumberMismatch { line1: String, line2: String },
    #[error("Element set epoch is out of range")]
    Epoch,
}

/// A validated name + two element lines.
///
/// Both lines are 69 columns, checksum-valid and refer to the same catalog number.
/// Immutable once constructed.
#[derive(Clone, PartialEq, Debug)]
pub struct OrbitalElementSet {
    name: String,
    line1: String,
    line2: String,
    catalog_number: String,
    classification: char,
    designator: String,
    epoch: UtcTimestamp,
}

impl OrbitalElementSet {
    pub fn new<N, L1, L2>(name: N, line1: L1, line2: L2) -> Result<Self, ElementSetError>
    where
        N: Into<String>,
        L1: Into<String>,
        L2: Into<String>,
    {
        let name = name.into();
        let line1 = line1.into();
        let line2 = line2.into();

        check_line(&line1, 1)?;
        check_line(&line2, 2)?;

        let (_, fields) = line1_fields(&line1).map_err(|e| line_error(&e, 1))?;
        let (_, line2_catalog_number) =
            line2_catalog_number(&line2).map_err(|e| line_error(&e, 2))?;

        if fields.catalog_number != line2_catalog_number {
            return Err(ElementSetError::CatalogNumberMismatch {
                line1: fields.catalog_number.to_owned(),
                line2: line2_catalog_number.to_owned(),
            });
        }

        let epoch = epoch_from_fields(fields.epoch_year, fields.epoch_day)?;
        let catalog_number = fields.catalog_number.to_owned();
        let designator = fields.designator.to_owned();
        let classification = fields.classification;
        debug!(%name, %catalog_number, %epoch, "Accepted element set");

        Ok(Self {
            name,
            line1,
            line2,
            catalog_number,
            classification,
            designator,
            epoch,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    /// Satellite catalog number, e.g. 25544
    pub fn catalog_number(&self) -> &str {
        &self.catalog_number
    }

    /// 'U'nclassified, 'C'lassified or 'S'ecret
    pub fn classification(&self) -> char {
        self.classification
    }

    /// International designator (launch year, launch number, piece)
    pub fn international_designator(&self) -> &str {
        &self.designator
    }

    /// Reference epoch of the mean elements
    pub fn epoch(&self) -> UtcTimestamp {
        self.epoch
    }

    /// Signed time since the element epoch
    pub fn age_at(&self, t: UtcTimestamp) -> Duration {
        t - self.epoch
    }

    /// Predictions further than two weeks from epoch (either side) are unreliable
    pub fn is_stale_at(&self, t: UtcTimestamp) -> bool {
        let horizon = Duration::days(RELIABLE_PREDICTION_HORIZON_DAYS);
        self.age_at(t).num_seconds().abs() > horizon.num_seconds()
    }
}

impl fmt::Display for OrbitalElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.name, self.line1, self.line2)
    }
}

impl TryFrom<UnstructuredTle> for OrbitalElementSet {
    type Error = ElementSetError;

    fn try_from(tle: UnstructuredTle) -> Result<Self, Self::Error> {
        OrbitalElementSet::new(tle.name, tle.line1, tle.line2)
    }
}

impl From<&OrbitalElementSet> for UnstructuredTle {
    fn from(set: &OrbitalElementSet) -> Self {
        UnstructuredTle {
            name: set.name.clone(),
            line1: set.line1.clone(),
            line2: set.line2.clone(),
        }
    }
}

/// Modulo-10 sum over the first 68 columns; digits count their value, '-' counts one
pub fn checksum(line: &str) -> u32 {
    line.chars()
        .take(ELEMENT_LINE_LEN - 1)
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

fn check_line(line: &str, line_no: u8) -> Result<(), ElementSetError> {
    if !line.is_ascii() {
        return Err(ElementSetError::Malformed { line: line_no });
    }
    if line.len() != ELEMENT_LINE_LEN {
        return Err(ElementSetError::LineLength {
            line: line_no,
            len: line.len(),
        });
    }
    let recorded = line
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .ok_or(ElementSetError::Malformed { line: line_no })?;
    let computed = checksum(line);
    if recorded != computed {
        return Err(ElementSetError::Checksum {
            line: line_no,
            recorded,
            computed,
        });
    }
    Ok(())
}

fn line_error(e: &nom::Err<crate::ParseError<&str>>, line_no: u8) -> ElementSetError {
    match e {
        nom::Err::Error(crate::ParseError::LineNumber) => {
            ElementSetError::LineNumber { line: line_no }
        }
        _ => ElementSetError::Malformed { line: line_no },
    }
}

/// Two-digit years 57..=99 are 1957..=1999, everything else is 20xx.
/// Day 1.0 is January 1st, 00:00 UTC.
fn epoch_from_fields(year: u32, day_of_year: f64) -> Result<UtcTimestamp, ElementSetError> {
    let century = if year >= 57 { 1900 } else { 2000 };
    let year = (century + year) as i32;
    if !(1.0..367.0).contains(&day_of_year) {
        return Err(ElementSetError::Epoch);
    }
    let start_of_year = NaiveDate::from_yo_opt(year, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or(ElementSetError::Epoch)?
        .and_utc();
    let offset_ns = ((day_of_year - 1.0) * 86_400_000_000_000.0).round() as i64;
    Ok(start_of_year + Duration::nanoseconds(offset_ns))
}
