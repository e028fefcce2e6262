use crate::time::UtcTimestamp;
use derive_more::Display;
use serde::Serialize;

/// Object position in the propagator's Earth-centered inertial frame (TEME)
#[derive(Copy, Clone, PartialEq, Debug, Display)]
#[display(fmt = "{{t: {}, pos_km: {}}}", "timestamp", "position_km")]
pub struct EarthCenteredPosition {
    pub timestamp: UtcTimestamp,

    /// Position [km]
    pub position_km: na::Vector3<f64>,
}

impl EarthCenteredPosition {
    pub fn new(timestamp: UtcTimestamp, position_km: na::Vector3<f64>) -> Self {
        Self {
            timestamp,
            position_km,
        }
    }
}

/// Geodetic (WGS-84) sub-point
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Display, Serialize)]
#[display(
    fmt = "{{lat: {:.4}, lon: {:.4}, elev_km: {:.3}}}",
    "latitude_deg",
    "longitude_deg",
    "elevation_km"
)]
pub struct GeoPosition {
    /// [-90, 90]
    pub latitude_deg: f64,

    /// (-180, 180], except for unwrapped ground track points
    pub longitude_deg: f64,

    /// Height above the ellipsoid [km]
    pub elevation_km: f64,
}

impl GeoPosition {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            elevation_km,
        }
    }
}
