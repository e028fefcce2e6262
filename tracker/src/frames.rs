//! TEME <-> Earth-fixed rotation.
//!
//! Only Earth rotation is modelled (IAU-82 mean sidereal time); polar motion
//! and UT1-UTC are ignored, which is well within what SGP4 itself delivers.

use crate::units::Angle;
use na::{Rotation3, Vector3};
use std::f64::consts::TAU;
use track_types::prelude::UtcTimestamp;

const SECONDS_PER_DAY: f64 = 86_400.0;
const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;
const J2000_JULIAN_DATE: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

pub fn julian_date(t: UtcTimestamp) -> f64 {
    let secs = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9;
    secs / SECONDS_PER_DAY + UNIX_EPOCH_JULIAN_DATE
}

/// Greenwich mean sidereal time, [0, 2π)
pub fn gmst(t: UtcTimestamp) -> Angle {
    let tut1 = (julian_date(t) - J2000_JULIAN_DATE) / DAYS_PER_JULIAN_CENTURY;
    let secs = 67_310.548_41
        + (876_600.0 * 3_600.0 + 8_640_184.812_866) * tut1
        + 0.093_104 * tut1 * tut1
        - 6.2e-6 * tut1 * tut1 * tut1;
    Angle::from_radians((secs * TAU / SECONDS_PER_DAY).rem_euclid(TAU))
}

pub fn teme_to_ecef(r_teme: &Vector3<f64>, t: UtcTimestamp) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst(t).as_radians()) * r_teme
}

pub fn ecef_to_teme(r_ecef: &Vector3<f64>, t: UtcTimestamp) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), gmst(t).as_radians()) * r_ecef
}
