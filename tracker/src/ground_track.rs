use crate::{
    geolocator::sub_points,
    propagator::{PropagationError, Propagator},
    units::Time,
};
use tracing::debug;
use track_types::prelude::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    #[error("Track step must be positive, got {0:?}")]
    InvalidStep(Time),
    #[error("Track horizon must not be negative, got {0:?}")]
    InvalidHorizon(Time),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
}

/// Sub-points at `start + k * step` for `k = 0..=floor(horizon / step)`, with
/// longitudes unwrapped into a continuous signal.
///
/// Unwrapped longitudes can leave (-180, 180]; consumers must draw them as-is.
pub fn track<P: Propagator + ?Sized>(
    propagator: &P,
    start: UtcTimestamp,
    horizon: Time,
    step: Time,
) -> Result<Vec<TrackPoint>, TrackError> {
    if step.as_secs() <= 0.0 {
        return Err(TrackError::InvalidStep(step));
    }
    if horizon.as_secs() < 0.0 {
        return Err(TrackError::InvalidHorizon(horizon));
    }

    // Nudge so that exact multiples don't lose their last sample to rounding
    let last = (horizon / step + 1e-9).floor() as usize;
    let instants = (0..=last).map(|k| (step * k as f64).after(start));
    let mut points = sub_points(propagator, instants)?;

    let raw: Vec<f64> = points.iter().map(|p| p.position.longitude_deg).collect();
    for (p, lon) in points.iter_mut().zip(unwrap_longitudes(&raw)) {
        p.position.longitude_deg = lon;
    }

    debug!(%start, points = points.len(), "Assembled ground track");
    Ok(points)
}

/// Remove the ±360° jumps at the antimeridian.
///
/// Each jump between consecutive raw samples beyond 180° shifts the running
/// offset by 360°, and every later sample carries that offset.
pub fn unwrap_longitudes(raw: &[f64]) -> Vec<f64> {
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    raw.iter()
        .map(|&lon| {
            if let Some(p) = prev {
                let d = lon - p;
                if d > 180.0 {
                    offset -= 360.0;
                } else if d < -180.0 {
                    offset += 360.0;
                }
            }
            prev = Some(lon);
            lon + offset
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::Sgp4Propagator;
    use approx::assert_relative_eq;
    use catalog::OrbitalElementSet;

    fn iss() -> Sgp4Propagator {
        let set = OrbitalElementSet::new(
            "ISS (ZARYA)",
            "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927",
            "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537",
        )
        .unwrap();
        Sgp4Propagator::new(&set).unwrap()
    }

    #[test]
    fn sample_count_includes_both_ends() {
        let p = iss();
        let points = track(&p, p.epoch(), Time::from_minutes(30.0), Time::from_minutes(5.0)).unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].timestamp, p.epoch());
        assert_eq!(points[6].timestamp, Time::from_minutes(30.0).after(p.epoch()));

        let points = track(&p, p.epoch(), Time::from_minutes(32.0), Time::from_minutes(5.0)).unwrap();
        assert_eq!(points.len(), 7);
        let points = track(&p, p.epoch(), Time::from_secs(0.0), Time::from_minutes(5.0)).unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn repeated_tracks_are_identical() {
        let p = iss();
        let a = track(&p, p.epoch(), Time::from_hours(3.0), Time::from_minutes(1.0)).unwrap();
        let b = track(&p, p.epoch(), Time::from_hours(3.0), Time::from_minutes(1.0)).unwrap();
        assert_eq!(a, b);
        for w in a.windows(2) {
            assert!((w[1].position.longitude_deg - w[0].position.longitude_deg).abs() <= 180.0);
        }
    }

    #[test]
    fn rejects_bad_arguments() {
        let p = iss();
        assert!(matches!(
            track(&p, p.epoch(), Time::from_minutes(30.0), Time::from_secs(0.0)),
            Err(TrackError::InvalidStep(_))
        ));
        assert!(matches!(
            track(&p, p.epoch(), Time::from_minutes(-1.0), Time::from_minutes(5.0)),
            Err(TrackError::InvalidHorizon(_))
        ));
    }

    #[test]
    fn eastbound_crossing_keeps_increasing() {
        let unwrapped = unwrap_longitudes(&[170.0, 175.0, -178.0, -170.0, -165.0, -160.0, -155.0]);
        assert_eq!(
            unwrapped,
            vec![170.0, 175.0, 182.0, 190.0, 195.0, 200.0, 205.0]
        );
    }

    #[test]
    fn westbound_crossing_keeps_decreasing() {
        let unwrapped = unwrap_longitudes(&[-170.0, -178.0, 175.0, 168.0]);
        assert_eq!(unwrapped, vec![-170.0, -178.0, -185.0, -192.0]);
    }

    #[test]
    fn multiple_crossings_accumulate() {
        let raw = [150.0, -150.0, -90.0, 0.0, 90.0, 179.0, -100.0];
        let unwrapped = unwrap_longitudes(&raw);
        assert_eq!(unwrapped, vec![150.0, 210.0, 270.0, 360.0, 450.0, 539.0, 620.0]);
        for w in unwrapped.windows(2) {
            assert!((w[1] - w[0]).abs() <= 180.0);
        }
    }

    #[test]
    fn no_crossing_is_untouched() {
        let raw = [10.0, 20.5, 31.0, 25.0];
        assert_eq!(unwrap_longitudes(&raw), raw.to_vec());
        assert!(unwrap_longitudes(&[]).is_empty());
        assert_relative_eq!(unwrap_longitudes(&[-180.0 + 1e-9])[0], -180.0 + 1e-9);
    }
}
