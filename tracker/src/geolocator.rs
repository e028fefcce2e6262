use crate::{
    frames,
    propagator::{PropagationError, Propagator, Sgp4Propagator},
    units::{Angle, Length},
};
use catalog::OrbitalElementSet;
use nav_types::{ECEF, WGS84};
use serde::Serialize;
use tracing::warn;
use track_types::prelude::*;

/// Something that may not exist yet, e.g. before the first catalog fetch
/// succeeded. Not an error: callers render a waiting state.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "kebab-case")]
pub enum Availability<T> {
    Available(T),
    Unavailable,
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn available(self) -> Option<T> {
        match self {
            Availability::Available(v) => Some(v),
            Availability::Unavailable => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Availability<U> {
        match self {
            Availability::Available(v) => Availability::Available(f(v)),
            Availability::Unavailable => Availability::Unavailable,
        }
    }
}

impl<T> From<Option<T>> for Availability<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Availability::Unavailable, Availability::Available)
    }
}

pub type Location = Availability<TrackPoint>;

/// WGS-84 sub-point of a TEME position.
///
/// Latitude lands in [-90, 90], longitude in (-180, 180].
pub fn sub_point(position: &EarthCenteredPosition) -> GeoPosition {
    let r = frames::teme_to_ecef(&position.position_km, position.timestamp);
    let to_m = |km: f64| Length::from_kilometers(km).as_meters();
    let wgs = WGS84::from(ECEF::new(to_m(r.x), to_m(r.y), to_m(r.z)));
    GeoPosition::new(
        wgs.latitude_degrees(),
        Angle::from_degrees(wgs.longitude_degrees())
            .normalized_signed()
            .as_degrees(),
        Length::from_meters(wgs.altitude()).as_kilometers(),
    )
}

pub fn sub_points<P, I>(propagator: &P, instants: I) -> Result<Vec<TrackPoint>, PropagationError>
where
    P: Propagator + ?Sized,
    I: IntoIterator<Item = UtcTimestamp>,
{
    instants
        .into_iter()
        .map(|t| {
            propagator
                .position_at(t)
                .map(|pos| TrackPoint::new(t, sub_point(&pos)))
        })
        .collect()
}

/// Where the object is at `now`, or [`Location::Unavailable`] when there is
/// no element set yet
pub fn current_location(
    set: Option<&OrbitalElementSet>,
    now: UtcTimestamp,
) -> Result<Location, PropagationError> {
    let Some(set) = set else {
        return Ok(Location::Unavailable);
    };
    if set.is_stale_at(now) {
        warn!(
            object = set.name(),
            epoch = %set.epoch(),
            "Element set is too old for reliable predictions"
        );
    }
    let propagator = Sgp4Propagator::new(set)?;
    let pos = propagator.position_at(now)?;
    Ok(Location::Available(TrackPoint::new(now, sub_point(&pos))))
}
