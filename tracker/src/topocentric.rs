//! Observer-relative (east-north-up) look angles

use crate::{frames, units::Angle};
use derive_more::Display;
use na::{Matrix3, Vector3};
use nav_types::{ECEF, WGS84};
use serde::Serialize;
use track_types::prelude::*;

#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{az: {:.2}°, el: {:.2}°, range_km: {:.1}}}",
    "azimuth_deg",
    "elevation_deg",
    "range_km"
)]
pub struct LookAngles {
    /// Clockwise from true north, [0, 360)
    pub azimuth_deg: f64,

    /// Above the local horizon plane, [-90, 90]
    pub elevation_deg: f64,

    /// Slant range [km]
    pub range_km: f64,
}

/// Observer location in the Earth-fixed frame [km]
pub fn observer_ecef_km(observer: &ObserverLocation) -> Vector3<f64> {
    let pos = ECEF::from(WGS84::from_degrees_and_meters(
        observer.latitude_deg,
        observer.longitude_deg,
        observer.elevation_m,
    ));
    Vector3::new(pos.x(), pos.y(), pos.z()) / 1000.0
}

/// Rows are the observer's east, north and up unit vectors in the Earth-fixed frame
pub fn enu_basis(observer: &ObserverLocation) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = observer.latitude_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = observer.longitude_deg.to_radians().sin_cos();
    Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}

pub fn look_angles(observer: &ObserverLocation, position: &EarthCenteredPosition) -> LookAngles {
    let r_ecef = frames::teme_to_ecef(&position.position_km, position.timestamp);
    let rho = r_ecef - observer_ecef_km(observer);
    let enu = enu_basis(observer) * rho;
    let (east, north, up) = (enu.x, enu.y, enu.z);

    LookAngles {
        azimuth_deg: Angle::from_radians(east.atan2(north))
            .normalized_positive()
            .as_degrees(),
        elevation_deg: up.atan2(east.hypot(north)).to_degrees(),
        range_km: rho.norm(),
    }
}
