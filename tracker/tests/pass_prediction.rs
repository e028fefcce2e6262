use approx::assert_relative_eq;
use catalog::find_element_set;
use chrono::{TimeZone, Utc};
use std::f64::consts::PI;
use track_types::prelude::*;
use tracker_lib::{
    events::EventFinder,
    frames,
    geolocator::Availability,
    na,
    propagator::{PropagationError, Propagator, Sgp4Propagator},
    topocentric::{enu_basis, look_angles, observer_ecef_km},
    units::Time,
};

const STATIONS: &str = include_str!("../../catalog/test_fixtures/stations.txt");

fn new_delhi() -> ObserverLocation {
    ObserverLocation::new(28.7041, 77.1025, 0.0)
}

fn window_start() -> UtcTimestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

/// Flies due north of the observer at a fixed slant range. Elevation follows
/// `peak * sin(pi * u)` with `u` running 0..1 from rise to set, flattening
/// out at `-peak` once it is half a pass away from either end.
struct SyntheticArc {
    observer: ObserverLocation,
    rise: UtcTimestamp,
    set: UtcTimestamp,
    peak_deg: f64,
}

impl SyntheticArc {
    fn elevation_deg(&self, t: UtcTimestamp) -> f64 {
        let u = Time::between(self.rise, t) / Time::between(self.rise, self.set);
        if (-0.5..=1.5).contains(&u) {
            self.peak_deg * (PI * u).sin()
        } else {
            -self.peak_deg
        }
    }
}

impl Propagator for SyntheticArc {
    fn position_at(&self, t: UtcTimestamp) -> Result<EarthCenteredPosition, PropagationError> {
        let el = self.elevation_deg(t).to_radians();
        let enu = na::Vector3::new(0.0, el.cos(), el.sin()) * 1_000.0;
        let ecef = observer_ecef_km(&self.observer) + enu_basis(&self.observer).transpose() * enu;
        Ok(EarthCenteredPosition::new(t, frames::ecef_to_teme(&ecef, t)))
    }
}

fn arc(rise_offset: Time, duration: Time, peak_deg: f64) -> SyntheticArc {
    let rise = rise_offset.after(window_start());
    SyntheticArc {
        observer: new_delhi(),
        rise,
        set: duration.after(rise),
        peak_deg,
    }
}

#[test]
fn synthetic_arc_reports_requested_elevations() {
    let a = arc(Time::from_secs(1_000.0), Time::from_secs(600.0), 45.0);
    let peak = Time::from_secs(1_300.0).after(window_start());
    let angles = look_angles(&a.observer, &a.position_at(peak).unwrap());
    assert_relative_eq!(angles.elevation_deg, 45.0, epsilon = 1e-6);
    assert_relative_eq!(angles.range_km, 1_000.0, epsilon = 1e-6);
}

#[test]
fn single_pass_over_new_delhi() {
    // Rise is deliberately off the sampling grid
    let a = arc(Time::from_secs(36_017.5), Time::from_secs(570.0), 45.0);
    let passes = EventFinder::new()
        .find_passes(&a, &new_delhi(), window_start(), Time::from_days(2.0))
        .unwrap();

    assert_eq!(passes.len(), 1);
    let pass = passes[0];
    assert!(pass.rise < pass.culmination && pass.culmination < pass.set);
    assert!((pass.peak_altitude_deg - 45.0).abs() < 1e-3);
    assert!((pass.duration_minutes() - 9.5).abs() < 1e-2);

    assert!(Time::between(a.rise, pass.rise).abs().as_secs() <= 0.5);
    assert!(Time::between(a.set, pass.set).abs().as_secs() <= 0.5);
    let expected_culmination = Time::from_secs(285.0).after(a.rise);
    assert!(Time::between(expected_culmination, pass.culmination).abs().as_secs() <= 1.0);
}

#[test]
fn finer_precision_tightens_crossings() {
    let a = arc(Time::from_secs(36_017.5), Time::from_secs(570.0), 45.0);
    let passes = EventFinder::new()
        .with_precision(Time::from_millis(10.0))
        .find_passes(&a, &new_delhi(), window_start(), Time::from_days(1.0))
        .unwrap();
    assert_eq!(passes.len(), 1);
    assert!(Time::between(a.rise, passes[0].rise).abs().as_secs() <= 0.01);
    assert!(Time::between(a.set, passes[0].set).abs().as_secs() <= 0.01);
}

#[test]
fn threshold_shortens_the_pass() {
    let a = arc(Time::from_secs(36_017.5), Time::from_secs(570.0), 45.0);
    let finder = EventFinder::new().with_threshold(tracker_lib::units::Angle::from_degrees(10.0));
    let passes = finder
        .find_passes(&a, &new_delhi(), window_start(), Time::from_days(1.0))
        .unwrap();
    assert_eq!(passes.len(), 1);
    assert!(passes[0].rise > a.rise);
    assert!(passes[0].set < a.set);
    assert!((passes[0].peak_altitude_deg - 45.0).abs() < 1e-3);
}

#[test]
fn grazing_pass_between_samples() {
    // 40 s above the horizon, no 60 s sample lands inside it
    let a = arc(Time::from_secs(605.0), Time::from_secs(40.0), 5.0);
    let passes = EventFinder::new()
        .find_passes(&a, &new_delhi(), window_start(), Time::from_hours(1.0))
        .unwrap();

    assert_eq!(passes.len(), 1);
    assert!((passes[0].peak_altitude_deg - 5.0).abs() < 1e-2);
    assert!(Time::between(a.rise, passes[0].rise).abs().as_secs() <= 0.5);
    assert!(Time::between(a.set, passes[0].set).abs().as_secs() <= 0.5);
}

#[test]
fn pass_cut_by_window_end_is_dropped() {
    let a = arc(Time::from_secs(3_500.0), Time::from_secs(570.0), 45.0);
    let finder = EventFinder::new();
    let window = Time::from_hours(1.0);

    let events = finder
        .find_events(&a, &new_delhi(), window_start(), window)
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), PassEventKind::Rise);

    let passes = finder
        .find_passes(&a, &new_delhi(), window_start(), window)
        .unwrap();
    assert!(passes.is_empty());
}

#[test]
fn pass_in_progress_at_window_start_is_dropped() {
    let a = arc(Time::from_secs(-100.0), Time::from_secs(570.0), 45.0);
    let finder = EventFinder::new();
    let window = Time::from_hours(1.0);

    let kinds: Vec<PassEventKind> = finder
        .find_events(&a, &new_delhi(), window_start(), window)
        .unwrap()
        .iter()
        .map(PassEvent::kind)
        .collect();
    assert_eq!(kinds, vec![PassEventKind::Culmination, PassEventKind::Set]);

    assert!(finder
        .find_passes(&a, &new_delhi(), window_start(), window)
        .unwrap()
        .is_empty());
}

#[test]
fn no_passes_in_window() {
    let a = arc(Time::from_days(10.0), Time::from_secs(570.0), 45.0);
    let passes = EventFinder::new()
        .find_passes(&a, &new_delhi(), window_start(), Time::from_days(2.0))
        .unwrap();
    assert!(passes.is_empty());
}

#[test]
fn iss_passes_over_new_delhi() {
    let iss = find_element_set(STATIONS, "ISS (ZARYA)").unwrap();
    let propagator = Sgp4Propagator::new(&iss).unwrap();
    let observer = new_delhi();
    let finder = EventFinder::new();

    let passes = finder
        .find_passes(&propagator, &observer, iss.epoch(), Time::from_days(2.0))
        .unwrap();
    assert!(!passes.is_empty());

    for pass in passes.iter() {
        assert!(pass.rise < pass.culmination && pass.culmination < pass.set);
        assert!(pass.peak_altitude_deg > 0.0 && pass.peak_altitude_deg <= 90.0);
        assert!(pass.duration_minutes() > 0.0 && pass.duration_minutes() < 20.0);

        let at_rise = look_angles(&observer, &propagator.position_at(pass.rise).unwrap());
        assert!(at_rise.elevation_deg.abs() < 0.1);
        let at_peak = look_angles(&observer, &propagator.position_at(pass.culmination).unwrap());
        assert_relative_eq!(at_peak.elevation_deg, pass.peak_altitude_deg, epsilon = 1e-6);
    }

    for w in passes.windows(2) {
        assert!(w[0].set < w[1].rise);
    }

    let again = finder
        .find_passes(&propagator, &observer, iss.epoch(), Time::from_days(2.0))
        .unwrap();
    assert_eq!(passes, again);
}

mod service {
    use super::*;
    use tracker_lib::{
        cache::RefreshOutcome,
        config::{Config, ConfigError},
        report::DisplayZone,
        service::{ServiceError, TrackingService},
        source::FileCatalogSource,
    };

    const FIXTURE: &str = "../catalog/test_fixtures/stations.txt";

    fn service(path: &str) -> TrackingService<FileCatalogSource> {
        let mut cfg = Config::default();
        cfg.timezone = Some("utc".to_owned());
        let settings = cfg.settings().unwrap();
        TrackingService::from_settings(&settings, FileCatalogSource::new(path))
    }

    fn iss_epoch() -> UtcTimestamp {
        find_element_set(STATIONS, "ISS (ZARYA)").unwrap().epoch()
    }

    #[test]
    fn unavailable_until_refreshed() {
        let svc = service(FIXTURE);
        let now = iss_epoch();
        assert_eq!(svc.display_zone(), DisplayZone::Utc);
        assert_eq!(svc.current_location(now).unwrap(), Availability::Unavailable);
        assert_eq!(
            svc.passes(&new_delhi(), now, 2).unwrap(),
            Availability::Unavailable
        );

        assert!(matches!(svc.refresh(now), RefreshOutcome::Refreshed));
        assert!(matches!(svc.refresh(now), RefreshOutcome::Fresh));
        let here = svc.current_location(now).unwrap().available().unwrap();
        assert_eq!(here.timestamp, now);
        assert!(here.position.latitude_deg.abs() <= 52.0);
    }

    #[test]
    fn missing_catalog_stays_unavailable() {
        let svc = service("does/not/exist.txt");
        let now = iss_epoch();
        assert!(matches!(svc.refresh(now), RefreshOutcome::Unavailable(_)));
        assert!(!svc.current_location(now).unwrap().is_available());
        assert!(svc.cache().fetched_at().is_none());
    }

    #[test]
    fn prediction_window_is_validated() {
        let svc = service(FIXTURE);
        let now = iss_epoch();
        svc.refresh(now);
        for days in [0, 8] {
            assert!(matches!(
                svc.passes(&new_delhi(), now, days),
                Err(ServiceError::Config(ConfigError::Days(d))) if d == days
            ));
        }
        let bad = ObserverLocation::new(95.0, 0.0, 0.0);
        assert!(matches!(
            svc.passes(&bad, now, 2),
            Err(ServiceError::Config(ConfigError::Latitude(_)))
        ));
    }

    #[test]
    fn pass_rows_in_utc() {
        let svc = service(FIXTURE);
        let now = iss_epoch();
        svc.refresh(now);
        let rows = svc.pass_rows(&new_delhi(), now, 2).unwrap().available().unwrap();
        assert!(!rows.is_empty());
        for row in rows.iter() {
            assert!(row.rise_time.ends_with("UTC+0000"));
            assert!(row.peak_altitude_deg.parse::<f64>().unwrap() > 0.0);
        }
    }

    #[test]
    fn track_is_idempotent_and_continuous() {
        let svc = service(FIXTURE);
        let now = iss_epoch();
        svc.refresh(now);
        let horizon = Time::from_minutes(180.0);
        let step = Time::from_minutes(1.0);

        let first = svc.track(now, horizon, step).unwrap().available().unwrap();
        let second = svc.track(now, horizon, step).unwrap().available().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 181);
        assert_eq!(first[0].timestamp, now);
        for w in first.windows(2) {
            assert!((w[1].position.longitude_deg - w[0].position.longitude_deg).abs() <= 180.0);
        }
    }
}
