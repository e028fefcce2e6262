//! Rise / culmination / set search over a time window.
//!
//! The observer-relative elevation is sampled on a coarse grid. Threshold
//! crossings between samples are refined by bisection, interior maxima by a
//! golden-section search. Events are then grouped into complete passes.

use crate::{
    propagator::{PropagationError, Propagator},
    topocentric::look_angles,
    units::{Angle, Time},
};
use tracing::debug;
use track_types::prelude::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    #[error("Search window must have a positive duration, got {0:?}")]
    InvalidWindow(Time),
    #[error("Search step must be positive, got {0:?}")]
    InvalidStep(Time),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
}

#[derive(Copy, Clone, Debug)]
pub struct EventFinder {
    step: Time,
    precision: Time,
    threshold: Angle,
}

impl Default for EventFinder {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            precision: Self::DEFAULT_PRECISION,
            threshold: Angle::from_degrees(0.0),
        }
    }
}

impl EventFinder {
    /// Comfortably shorter than the shortest LEO pass
    pub const DEFAULT_STEP: Time = Time::from_secs(60.0);
    pub const DEFAULT_PRECISION: Time = Time::from_secs(0.5);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: Time) -> Self {
        self.step = step;
        self
    }

    pub fn with_precision(mut self, precision: Time) -> Self {
        self.precision = precision;
        self
    }

    /// Elevation the object has to reach to count as visible
    pub fn with_threshold(mut self, threshold: Angle) -> Self {
        self.threshold = threshold;
        self
    }

    /// Complete passes fully contained in `[start, start + window]`
    pub fn find_passes<P: Propagator + ?Sized>(
        &self,
        propagator: &P,
        observer: &ObserverLocation,
        start: UtcTimestamp,
        window: Time,
    ) -> Result<Vec<Pass>, EventError> {
        let events = self.find_events(propagator, observer, start, window)?;
        let passes = group_passes(&events);
        debug!(
            events = events.len(),
            passes = passes.len(),
            %start,
            window_h = window.as_secs() / 3600.0,
            "Pass search complete"
        );
        Ok(passes)
    }

    /// Chronological event stream, possibly starting or ending mid-pass
    pub fn find_events<P: Propagator + ?Sized>(
        &self,
        propagator: &P,
        observer: &ObserverLocation,
        start: UtcTimestamp,
        window: Time,
    ) -> Result<Vec<PassEvent>, EventError> {
        if window.as_secs() <= 0.0 {
            return Err(EventError::InvalidWindow(window));
        }
        if self.step.as_secs() <= 0.0 {
            return Err(EventError::InvalidStep(self.step));
        }

        let search = Search {
            propagator,
            observer,
            start,
            threshold: self.threshold,
            precision: self.precision.as_secs().max(1e-3),
        };

        // Sample offsets [s] from the window start; the last one sits on the window end
        let window_secs = window.as_secs();
        let n = (window_secs / self.step.as_secs()).ceil() as usize;
        let offsets: Vec<f64> = (0..=n)
            .map(|i| (i as f64 * self.step.as_secs()).min(window_secs))
            .collect();
        let samples = offsets
            .iter()
            .map(|s| search.relative_elevation(*s))
            .collect::<Result<Vec<f64>, _>>()?;

        let mut events = Vec::new();

        for i in 1..samples.len() {
            let (e0, e1) = (samples[i - 1], samples[i]);
            let (s0, s1) = (offsets[i - 1], offsets[i]);
            if e0 < 0.0 && e1 >= 0.0 {
                let s = search.crossing(s0, s1, true)?;
                events.push(PassEvent::Rise(search.instant(s)));
            } else if e0 >= 0.0 && e1 < 0.0 {
                let s = search.crossing(s0, s1, false)?;
                events.push(PassEvent::Set(search.instant(s)));
            }
        }

        for i in 1..samples.len().saturating_sub(1) {
            let (before, here, after) = (samples[i - 1], samples[i], samples[i + 1]);
            if !(before < here && here >= after) {
                continue;
            }

            let (mut s_max, mut e_max) = search.maximum(offsets[i - 1], offsets[i + 1])?;
            if e_max < here {
                s_max = offsets[i];
                e_max = here;
            }
            if e_max < 0.0 {
                continue;
            }

            if here < 0.0 {
                // Grazing pass, every coarse sample sits below the threshold
                let rise = search.crossing(offsets[i - 1], s_max, true)?;
                let set = search.crossing(s_max, offsets[i + 1], false)?;
                debug!(peak = %search.instant(s_max), "Found grazing pass between samples");
                events.push(PassEvent::Rise(search.instant(rise)));
                events.push(PassEvent::Set(search.instant(set)));
            }

            events.push(PassEvent::Culmination {
                timestamp: search.instant(s_max),
                elevation_deg: e_max + self.threshold.as_degrees(),
            });
        }

        events.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then(a.kind().cmp(&b.kind()))
        });

        Ok(events)
    }
}

/// Group an event stream into complete passes.
///
/// Walks the stream as a state machine: a pass opens on Rise, keeps the highest
/// Culmination and closes on Set. Culminations or Sets with no open pass are
/// leftovers from a pass that began before the stream and are dropped, a Rise
/// while a pass is open restarts it, and an open pass at the end of the stream
/// is discarded. Passes whose instants are not strictly increasing are dropped.
pub fn group_passes(events: &[PassEvent]) -> Vec<Pass> {
    struct Open {
        rise: UtcTimestamp,
        culmination: Option<(UtcTimestamp, f64)>,
    }

    let mut passes = Vec::new();
    let mut open: Option<Open> = None;

    for event in events {
        match *event {
            PassEvent::Rise(t) => {
                if open.is_some() {
                    debug!(rise = %t, "Rise inside an open pass, restarting it");
                }
                open = Some(Open {
                    rise: t,
                    culmination: None,
                });
            }
            PassEvent::Culmination {
                timestamp,
                elevation_deg,
            } => match open.as_mut() {
                Some(Open {
                    culmination: Some((_, best)),
                    ..
                }) if *best >= elevation_deg => (),
                Some(o) => o.culmination = Some((timestamp, elevation_deg)),
                None => debug!(%timestamp, "Dropping culmination outside of a pass"),
            },
            PassEvent::Set(set) => match open.take() {
                Some(Open {
                    rise,
                    culmination: Some((culmination, peak)),
                }) if rise < culmination && culmination < set => {
                    passes.push(Pass {
                        rise,
                        culmination,
                        set,
                        peak_altitude_deg: peak,
                    });
                }
                Some(o) => debug!(rise = %o.rise, %set, "Dropping malformed pass"),
                None => debug!(%set, "Dropping set outside of a pass"),
            },
        }
    }

    if let Some(o) = open {
        debug!(rise = %o.rise, "Dropping incomplete pass at the end of the window");
    }

    passes
}

struct Search<'a, P: ?Sized> {
    propagator: &'a P,
    observer: &'a ObserverLocation,
    start: UtcTimestamp,
    threshold: Angle,
    /// [s]
    precision: f64,
}

impl<'a, P: Propagator + ?Sized> Search<'a, P> {
    fn instant(&self, offset_secs: f64) -> UtcTimestamp {
        Time::from_secs(offset_secs).after(self.start)
    }

    /// Elevation above the threshold [deg] at `offset_secs` into the window
    fn relative_elevation(&self, offset_secs: f64) -> Result<f64, PropagationError> {
        let pos = self.propagator.position_at(self.instant(offset_secs))?;
        Ok(look_angles(self.observer, &pos).elevation_deg - self.threshold.as_degrees())
    }

    /// Bisect a threshold crossing inside `[lo, hi]`
    fn crossing(&self, mut lo: f64, mut hi: f64, rising: bool) -> Result<f64, PropagationError> {
        while hi - lo > self.precision {
            let mid = 0.5 * (lo + hi);
            let above = self.relative_elevation(mid)? >= 0.0;
            if above == rising {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(0.5 * (lo + hi))
    }

    /// Golden-section search for the elevation maximum inside `[a, b]`
    fn maximum(&self, mut a: f64, mut b: f64) -> Result<(f64, f64), PropagationError> {
        let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
        let mut c = b - inv_phi * (b - a);
        let mut d = a + inv_phi * (b - a);
        let mut fc = self.relative_elevation(c)?;
        let mut fd = self.relative_elevation(d)?;
        while b - a > self.precision {
            if fc > fd {
                b = d;
                d = c;
                fd = fc;
                c = b - inv_phi * (b - a);
                fc = self.relative_elevation(c)?;
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + inv_phi * (b - a);
                fd = self.relative_elevation(d)?;
            }
        }
        let s = 0.5 * (a + b);
        Ok((s, self.relative_elevation(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> UtcTimestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn at(minutes: i64) -> UtcTimestamp {
        t0() + chrono::Duration::minutes(minutes)
    }

    fn culm(minutes: i64, elevation_deg: f64) -> PassEvent {
        PassEvent::Culmination {
            timestamp: at(minutes),
            elevation_deg,
        }
    }

    #[test]
    fn groups_complete_triples() {
        let events = [
            PassEvent::Rise(at(0)),
            culm(5, 30.0),
            PassEvent::Set(at(10)),
            PassEvent::Rise(at(100)),
            culm(104, 12.0),
            PassEvent::Set(at(108)),
        ];
        let passes = group_passes(&events);
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].rise, at(0));
        assert_eq!(passes[0].culmination, at(5));
        assert_eq!(passes[0].set, at(10));
        assert_eq!(passes[0].peak_altitude_deg, 30.0);
        assert_eq!(passes[1].peak_altitude_deg, 12.0);
    }

    #[test]
    fn drops_pass_in_progress_at_window_start() {
        let events = [
            culm(2, 40.0),
            PassEvent::Set(at(6)),
            PassEvent::Rise(at(100)),
            culm(104, 12.0),
            PassEvent::Set(at(108)),
        ];
        let passes = group_passes(&events);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].rise, at(100));
    }

    #[test]
    fn drops_incomplete_trailing_pass() {
        let events = [
            PassEvent::Rise(at(0)),
            culm(5, 30.0),
            PassEvent::Set(at(10)),
            PassEvent::Rise(at(100)),
            culm(104, 12.0),
        ];
        assert_eq!(group_passes(&events).len(), 1);
        assert!(group_passes(&[PassEvent::Rise(at(0))]).is_empty());
        assert!(group_passes(&[]).is_empty());
    }

    #[test]
    fn keeps_highest_culmination() {
        let events = [
            PassEvent::Rise(at(0)),
            culm(3, 20.0),
            culm(6, 25.0),
            culm(8, 22.0),
            PassEvent::Set(at(10)),
        ];
        let passes = group_passes(&events);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].culmination, at(6));
        assert_eq!(passes[0].peak_altitude_deg, 25.0);
    }

    #[test]
    fn rise_without_set_restarts() {
        let events = [
            PassEvent::Rise(at(0)),
            culm(3, 20.0),
            PassEvent::Rise(at(50)),
            culm(53, 10.0),
            PassEvent::Set(at(56)),
        ];
        let passes = group_passes(&events);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].rise, at(50));
        assert_eq!(passes[0].peak_altitude_deg, 10.0);
    }

    #[test]
    fn set_without_culmination_is_dropped() {
        let events = [PassEvent::Rise(at(0)), PassEvent::Set(at(1))];
        assert!(group_passes(&events).is_empty());
    }

    #[test]
    fn rejects_empty_window() {
        struct Never;
        impl Propagator for Never {
            fn position_at(
                &self,
                _t: UtcTimestamp,
            ) -> Result<EarthCenteredPosition, PropagationError> {
                unreachable!()
            }
        }
        let obs = ObserverLocation::new(0.0, 0.0, 0.0);
        let finder = EventFinder::default();
        assert_eq!(
            finder.find_passes(&Never, &obs, t0(), Time::from_secs(0.0)),
            Err(EventError::InvalidWindow(Time::from_secs(0.0)))
        );
        assert!(matches!(
            finder
                .with_step(Time::from_secs(-1.0))
                .find_events(&Never, &obs, t0(), Time::from_days(1.0)),
            Err(EventError::InvalidStep(_))
        ));
    }
}
