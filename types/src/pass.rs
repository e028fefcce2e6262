use crate::time::UtcTimestamp;
use derive_more::Display;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Serialize)]
pub enum PassEventKind {
    Rise,
    Culmination,
    Set,
}

/// A single horizon crossing or elevation peak
#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
pub enum PassEvent {
    #[display(fmt = "Rise({})", "_0")]
    Rise(UtcTimestamp),
    #[display(fmt = "Culmination({}, {:.2}°)", "timestamp", "elevation_deg")]
    Culmination {
        timestamp: UtcTimestamp,
        /// Elevation angle at the peak [deg]
        elevation_deg: f64,
    },
    #[display(fmt = "Set({})", "_0")]
    Set(UtcTimestamp),
}

impl PassEvent {
    pub fn kind(&self) -> PassEventKind {
        match self {
            PassEvent::Rise(_) => PassEventKind::Rise,
            PassEvent::Culmination { .. } => PassEventKind::Culmination,
            PassEvent::Set(_) => PassEventKind::Set,
        }
    }

    pub fn timestamp(&self) -> UtcTimestamp {
        match self {
            PassEvent::Rise(t) | PassEvent::Set(t) => *t,
            PassEvent::Culmination { timestamp, .. } => *timestamp,
        }
    }
}

/// A complete rise -> culmination -> set triple
#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{rise: {}, culmination: {}, set: {}, peak: {:.2}°}}",
    "rise",
    "culmination",
    "set",
    "peak_altitude_deg"
)]
pub struct Pass {
    pub rise: UtcTimestamp,
    pub culmination: UtcTimestamp,
    pub set: UtcTimestamp,

    /// Elevation angle at culmination [deg]
    pub peak_altitude_deg: f64,
}

impl Pass {
    /// Time above the horizon [min], never negative
    pub fn duration_minutes(&self) -> f64 {
        let dt = self.set - self.rise;
        let secs = dt
            .num_nanoseconds()
            .map(|ns| ns as f64 / 1_000_000_000.0)
            .unwrap_or_else(|| dt.num_milliseconds() as f64 / 1_000.0);
        (secs / 60.0).max(0.0)
    }
}
