//! Earth-centered positions from an element set.
//!
//! The numerical model is the `sgp4` crate. Everything downstream only sees the
//! [`Propagator`] trait, so tests and tools can substitute synthetic orbits.

use crate::units::Time;
use catalog::OrbitalElementSet;
use tracing::{debug, warn};
use track_types::prelude::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    #[error("The SGP4 model rejected the element set for '{object}': {reason}")]
    Elements { object: String, reason: String },
    #[error("SGP4 propagation of '{object}' failed at {timestamp}: {reason}")]
    Propagation {
        object: String,
        timestamp: UtcTimestamp,
        reason: String,
    },
}

pub trait Propagator {
    /// Position in the Earth-centered TEME frame [km] at `t`.
    ///
    /// Deterministic for a given `t`.
    fn position_at(&self, t: UtcTimestamp) -> Result<EarthCenteredPosition, PropagationError>;
}

impl<P: Propagator + ?Sized> Propagator for &P {
    fn position_at(&self, t: UtcTimestamp) -> Result<EarthCenteredPosition, PropagationError> {
        (**self).position_at(t)
    }
}

pub struct Sgp4Propagator {
    object: String,
    epoch: UtcTimestamp,
    constants: sgp4::Constants,
}

impl std::fmt::Debug for Sgp4Propagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sgp4Propagator")
            .field("object", &self.object)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Sgp4Propagator {
    pub fn new(set: &OrbitalElementSet) -> Result<Self, PropagationError> {
        let rejected = |reason: String| PropagationError::Elements {
            object: set.name().to_owned(),
            reason,
        };
        let elements = sgp4::Elements::from_tle(
            Some(set.name().to_owned()),
            set.line1().as_bytes(),
            set.line2().as_bytes(),
        )
        .map_err(|e| rejected(e.to_string()))?;
        let constants =
            sgp4::Constants::from_elements(&elements).map_err(|e| rejected(e.to_string()))?;

        debug!(object = set.name(), epoch = %set.epoch(), "Initialized SGP4 model");

        Ok(Self {
            object: set.name().to_owned(),
            epoch: set.epoch(),
            constants,
        })
    }

    pub fn epoch(&self) -> UtcTimestamp {
        self.epoch
    }
}

impl Propagator for Sgp4Propagator {
    fn position_at(&self, t: UtcTimestamp) -> Result<EarthCenteredPosition, PropagationError> {
        let minutes = Time::between(self.epoch, t).as_minutes();
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| {
                warn!(object = %self.object, timestamp = %t, minutes, "SGP4 propagation failed");
                PropagationError::Propagation {
                    object: self.object.clone(),
                    timestamp: t,
                    reason: e.to_string(),
                }
            })?;
        let [x, y, z] = prediction.position;
        Ok(EarthCenteredPosition::new(t, na::Vector3::new(x, y, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn iss() -> OrbitalElementSet {
        OrbitalElementSet::new("ISS (ZARYA)", ISS_LINE1, ISS_LINE2).unwrap()
    }

    #[test]
    fn leo_radius_at_epoch() {
        let p = Sgp4Propagator::new(&iss()).unwrap();
        let pos = p.position_at(p.epoch()).unwrap();
        assert_eq!(pos.timestamp, p.epoch());
        // ~350 km above a 6378 km Earth
        let r = pos.position_km.norm();
        assert!(r > 6600.0 && r < 6800.0, "r = {r}");
    }

    #[test]
    fn deterministic() {
        let p = Sgp4Propagator::new(&iss()).unwrap();
        let t = Time::from_hours(7.25).after(p.epoch());
        let a = p.position_at(t).unwrap();
        let b = p.position_at(t).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn moves_a_full_orbit_in_one_period() {
        let p = Sgp4Propagator::new(&iss()).unwrap();
        // 15.72 rev/day
        let period = Time::from_days(1.0 / 15.721_253_91);
        let a = p.position_at(p.epoch()).unwrap().position_km;
        let half = p.position_at((period / 2.0).after(p.epoch())).unwrap().position_km;
        let full = p.position_at(period.after(p.epoch())).unwrap().position_km;
        assert!((a - half).norm() > 12_000.0);
        // Back near the start, give or take J2 drift
        assert!((a - full).norm() < 250.0);
        assert_relative_eq!(a.norm(), full.norm(), epsilon = 20.0);
    }
}
