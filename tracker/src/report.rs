//! Presentation helpers: display zones, pass tables, position strings.
//!
//! Everything is computed in UTC; conversion to the display zone happens here
//! and nowhere else.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::{fmt, str::FromStr, sync::OnceLock};
use tracing::debug;
use track_types::prelude::*;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z%z";

/// Fixed offsets have no abbreviation of their own
const FIXED_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC%z";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid display timezone '{0}', expected 'local', 'utc', an IANA name like 'Asia/Kolkata' or an offset like '+05:30'")]
pub struct InvalidDisplayZone(pub String);

/// Zone that timestamps are rendered in
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum DisplayZone {
    Utc,
    /// Whatever the host is configured for
    #[default]
    Local,
    Named(Tz),
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn format(&self, t: UtcTimestamp) -> String {
        match self {
            DisplayZone::Utc => format_in(&Utc, t),
            DisplayZone::Local => match host_zone() {
                Some(tz) => format_in(&tz, t),
                None => format_in(&Local, t),
            },
            DisplayZone::Named(tz) => format_in(tz, t),
            DisplayZone::Fixed(offset) => t
                .with_timezone(offset)
                .format(FIXED_OFFSET_FORMAT)
                .to_string(),
        }
    }
}

fn format_in<Z: TimeZone>(zone: &Z, t: UtcTimestamp) -> String
where
    Z::Offset: fmt::Display,
{
    t.with_timezone(zone).format(TIMESTAMP_FORMAT).to_string()
}

/// IANA zone from a `TZ`-style value, e.g. "Asia/Kolkata" or ":Asia/Kolkata"
fn named_zone(name: &str) -> Option<Tz> {
    name.trim().trim_start_matches(':').parse().ok()
}

/// The host zone by name, so `%Z` can print its abbreviation.
///
/// `None` when it can't be named, formatting then falls back to the bare
/// local offset.
fn host_zone() -> Option<Tz> {
    static HOST_ZONE: OnceLock<Option<Tz>> = OnceLock::new();
    *HOST_ZONE.get_or_init(|| {
        let from_env = std::env::var("TZ").ok().and_then(|v| named_zone(&v));
        let zone = from_env.or_else(|| {
            iana_time_zone::get_timezone()
                .ok()
                .and_then(|v| named_zone(&v))
        });
        debug!(zone = ?zone, "Resolved host timezone");
        zone
    })
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Utc => f.write_str("utc"),
            DisplayZone::Local => f.write_str("local"),
            DisplayZone::Named(tz) => f.write_str(tz.name()),
            DisplayZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = InvalidDisplayZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "utc" | "z" => return Ok(DisplayZone::Utc),
            "local" => return Ok(DisplayZone::Local),
            _ => (),
        }
        if let Ok(tz) = trimmed.parse::<Tz>() {
            return Ok(DisplayZone::Named(tz));
        }
        trimmed
            .parse::<FixedOffset>()
            .map(DisplayZone::Fixed)
            .map_err(|_| InvalidDisplayZone(s.to_owned()))
    }
}

/// One rendered line of the pass table
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PassRow {
    pub rise_time: String,
    pub culmination_time: String,
    pub set_time: String,
    /// Two decimals [deg]
    pub peak_altitude_deg: String,
    /// Two decimals [min]
    pub duration_min: String,
}

impl PassRow {
    pub const HEADERS: [&'static str; 5] = [
        "Rise Time",
        "Culmination Time",
        "Set Time",
        "Peak Altitude (deg)",
        "Duration (min)",
    ];

    pub fn new(pass: &Pass, zone: DisplayZone) -> Self {
        Self {
            rise_time: zone.format(pass.rise),
            culmination_time: zone.format(pass.culmination),
            set_time: zone.format(pass.set),
            peak_altitude_deg: format!("{:.2}", pass.peak_altitude_deg),
            duration_min: format!("{:.2}", pass.duration_minutes()),
        }
    }

    fn cells(&self) -> [&str; 5] {
        [
            &self.rise_time,
            &self.culmination_time,
            &self.set_time,
            &self.peak_altitude_deg,
            &self.duration_min,
        ]
    }
}

pub fn pass_rows(passes: &[Pass], zone: DisplayZone) -> Vec<PassRow> {
    passes.iter().map(|p| PassRow::new(p, zone)).collect()
}

/// Plain-text table, columns padded to their widest cell
pub fn render_pass_table(rows: &[PassRow]) -> String {
    if rows.is_empty() {
        return "No passes in the requested window\n".to_owned();
    }

    let mut widths = PassRow::HEADERS.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = table_line(PassRow::HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("-+-")));
    for row in rows {
        out.push_str(&table_line(row.cells(), &widths));
    }
    out
}

/// Headline printed above the pass table. Catalog names lose their
/// parenthesized suffix, "ISS (ZARYA)" reads as "ISS".
pub fn pass_summary(object: &str, observer: &ObserverLocation, days: u32, count: usize) -> String {
    let object = object.split(" (").next().unwrap_or(object).trim();
    let place = format!(
        "Lat: {}, Lon: {}",
        observer.latitude_deg, observer.longitude_deg
    );
    let window = if days == 1 {
        "the next day".to_owned()
    } else {
        format!("the next {days} days")
    };
    match count {
        0 => format!("No {object} passes predicted for {place} in {window}"),
        1 => format!("Found 1 pass for {place} in {window}"),
        n => format!("Found {n} passes for {place} in {window}"),
    }
}

fn table_line(cells: [&str; 5], widths: &[usize; 5]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}

/// Sub-point at the precision the dashboard shows
pub fn format_position(p: &GeoPosition) -> String {
    format!("{:.4}, {:.4}", p.latitude_deg, p.longitude_deg)
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PositionReport {
    pub timestamp: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_km: f64,
}

impl PositionReport {
    pub fn new(point: &TrackPoint, zone: DisplayZone) -> Self {
        let round4 = |v: f64| (v * 1e4).round() / 1e4;
        Self {
            timestamp: zone.format(point.timestamp),
            latitude_deg: round4(point.position.latitude_deg),
            longitude_deg: round4(point.position.longitude_deg),
            elevation_km: round4(point.position.elevation_km),
        }
    }
}

/// For zones that aren't [`DisplayZone`]s, e.g. in tests
pub fn format_timestamp<Z: TimeZone>(t: &DateTime<Z>) -> String
where
    Z::Offset: fmt::Display,
{
    t.format(TIMESTAMP_FORMAT).to_string()
}
