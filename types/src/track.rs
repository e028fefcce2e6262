use crate::{geo::GeoPosition, time::UtcTimestamp};
use derive_more::Display;
use serde::Serialize;

#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
#[display(fmt = "{{t: {}, pos: {}}}", "timestamp", "position")]
pub struct TrackPoint {
    pub timestamp: UtcTimestamp,
    pub position: GeoPosition,
}

impl TrackPoint {
    pub fn new(timestamp: UtcTimestamp, position: GeoPosition) -> Self {
        Self {
            timestamp,
            position,
        }
    }
}
