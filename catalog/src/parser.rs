//! Parsers for line-oriented element-set catalogs (one object per name/line1/line2 triple)

use crate::element_set::{ElementSetError, OrbitalElementSet};
use nom::{
    branch::alt,
    bytes::complete::take,
    character::complete::{anychar, char, line_ending, not_line_ending},
    combinator::{eof, map_res},
    error::{ErrorKind, FromExternalError},
    multi::{fold_many0, many0_count},
};
use tracing::debug;
use track_types::prelude::*;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Invalid element line number")]
    LineNumber,
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

/// Scan `text` for the first line containing `name` and take it together with
/// the two lines that follow as the object's element set.
pub fn find_element_set(
    text: &str,
    name: &str,
) -> std::result::Result<OrbitalElementSet, ElementSetError> {
    let lines: Vec<&str> = text.lines().collect();
    let idx = lines
        .iter()
        .position(|l| l.contains(name))
        .ok_or_else(|| ElementSetError::NotFound(name.to_owned()))?;

    if idx + 2 >= lines.len() {
        debug!(name, line = idx, total = lines.len(), "Truncated element set");
        return Err(ElementSetError::Incomplete(name.to_owned()));
    }

    OrbitalElementSet::new(
        lines[idx].trim(),
        lines[idx + 1].trim(),
        lines[idx + 2].trim(),
    )
}

/// Split a whole catalog into its records, in catalog order.
///
/// Only the three-line structure is checked here; field validation
/// happens when a record is turned into an [`OrbitalElementSet`].
pub fn parse_catalog(text: &str) -> Result<&str, Vec<UnstructuredTle>> {
    let (s, records) = fold_many0(
        tle,
        Vec::new,
        |mut records: Vec<UnstructuredTle>, tle| {
            records.push(tle);
            records
        },
    )(text)?;
    Ok((s, records))
}

fn tle(s: &str) -> Result<&str, UnstructuredTle> {
    // Blank separator lines between records
    let (s, _) = many0_count(line_ending)(s)?;
    let (s, name) = not_line_ending(s)?;
    let (s, _) = line_ending(s)?;
    let (s, line1) = not_line_ending(s)?;
    let (s, _) = line_ending(s)?;
    let (s, line2) = not_line_ending(s)?;
    let (s, _) = alt((line_ending, eof))(s)?;
    Ok((
        s,
        UnstructuredTle {
            name: name.trim().to_string(),
            line1: line1.trim().to_string(),
            line2: line2.trim().to_string(),
        },
    ))
}

/// Leading fields of the first element line
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Line1Fields<'a> {
    pub catalog_number: &'a str,
    pub classification: char,
    pub designator: &'a str,
    pub epoch_year: u32,
    pub epoch_day: f64,
}

pub(crate) fn line1_fields(s: &str) -> Result<&str, Line1Fields> {
    let (s, _) = line_number(s, '1')?;
    let (s, _) = char(' ')(s)?;
    let (s, catalog_number) = catalog_number(s)?;
    let (s, classification) = anychar(s)?;
    let (s, _) = char(' ')(s)?;
    let (s, designator) = take(8usize)(s)?;
    let (s, _) = char(' ')(s)?;
    let (s, epoch_year) = map_res(take(2usize), |y: &str| y.parse::<u32>())(s)?;
    let (s, epoch_day) = map_res(take(12usize), |d: &str| d.trim().parse::<f64>())(s)?;
    Ok((
        s,
        Line1Fields {
            catalog_number,
            classification,
            designator: designator.trim(),
            epoch_year,
            epoch_day,
        },
    ))
}

pub(crate) fn line2_catalog_number(s: &str) -> Result<&str, &str> {
    let (s, _) = line_number(s, '2')?;
    let (s, _) = char(' ')(s)?;
    catalog_number(s)
}

fn line_number(s: &str, expected: char) -> Result<&str, char> {
    let (rest, c) = anychar(s)?;
    if c == expected {
        Ok((rest, c))
    } else {
        Err(nom::Err::Error(ParseError::LineNumber))
    }
}

fn catalog_number(s: &str) -> Result<&str, &str> {
    let (s, num) = take(5usize)(s)?;
    let num = num.trim();
    if num.is_empty() || !num.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(nom::Err::Error(ParseError::Nom(s, ErrorKind::AlphaNumeric)));
    }
    Ok((s, num))
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E> FromExternalError<I, E> for ParseError<I> {
    fn from_external_error(s: I, kind: ErrorKind, _e: E) -> Self {
        ParseError::Nom(s, kind)
    }
}
