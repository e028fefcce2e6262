//! Everything a front end needs behind one handle: the cached element set,
//! the pass search, the ground track and the display zone.

use crate::{
    cache::{ElementSetCache, RefreshOutcome},
    config::{validate_days, validate_observer, ConfigError, Settings},
    events::{EventError, EventFinder},
    geolocator::{current_location, Availability, Location},
    ground_track::{track, TrackError},
    propagator::{PropagationError, Sgp4Propagator},
    report::{pass_rows, DisplayZone, PassRow},
    source::CatalogSource,
    units::Time,
};
use catalog::OrbitalElementSet;
use std::sync::Arc;
use tracing::warn;
use track_types::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
    #[error(transparent)]
    Events(#[from] EventError),
    #[error(transparent)]
    Track(#[from] TrackError),
}

#[derive(Debug)]
pub struct TrackingService<S> {
    cache: ElementSetCache<S>,
    finder: EventFinder,
    zone: DisplayZone,
}

impl<S: CatalogSource> TrackingService<S> {
    pub fn new(cache: ElementSetCache<S>, finder: EventFinder, zone: DisplayZone) -> Self {
        Self {
            cache,
            finder,
            zone,
        }
    }

    pub fn from_settings(settings: &Settings, source: S) -> Self {
        let cache = ElementSetCache::new(
            source,
            settings.object_name.clone(),
            settings.refresh_interval,
        );
        let finder = EventFinder::new()
            .with_step(settings.search_step)
            .with_threshold(settings.pass_horizon);
        Self::new(cache, finder, settings.display_zone)
    }

    pub fn cache(&self) -> &ElementSetCache<S> {
        &self.cache
    }

    pub fn display_zone(&self) -> DisplayZone {
        self.zone
    }

    pub fn refresh(&self, now: UtcTimestamp) -> RefreshOutcome {
        self.cache.refresh_if_expired(now)
    }

    pub fn current_location(&self, now: UtcTimestamp) -> Result<Location, ServiceError> {
        let set = self.cache.current();
        Ok(current_location(set.as_deref(), now)?)
    }

    /// Complete passes over `observer` in `[start, start + days]`
    pub fn passes(
        &self,
        observer: &ObserverLocation,
        start: UtcTimestamp,
        days: u32,
    ) -> Result<Availability<Vec<Pass>>, ServiceError> {
        let observer = validate_observer(
            observer.latitude_deg,
            observer.longitude_deg,
            observer.elevation_m,
        )?;
        let days = validate_days(days)?;

        let Some(set) = self.element_set(start) else {
            return Ok(Availability::Unavailable);
        };
        let propagator = Sgp4Propagator::new(&set)?;
        let passes = self.finder.find_passes(
            &propagator,
            &observer,
            start,
            Time::from_days(f64::from(days)),
        )?;
        Ok(Availability::Available(passes))
    }

    /// [`Self::passes`], rendered in the display zone
    pub fn pass_rows(
        &self,
        observer: &ObserverLocation,
        start: UtcTimestamp,
        days: u32,
    ) -> Result<Availability<Vec<PassRow>>, ServiceError> {
        Ok(self
            .passes(observer, start, days)?
            .map(|passes| pass_rows(&passes, self.zone)))
    }

    pub fn track(
        &self,
        start: UtcTimestamp,
        horizon: Time,
        step: Time,
    ) -> Result<Availability<Vec<TrackPoint>>, ServiceError> {
        let Some(set) = self.element_set(start) else {
            return Ok(Availability::Unavailable);
        };
        let propagator = Sgp4Propagator::new(&set)?;
        Ok(Availability::Available(track(
            &propagator,
            start,
            horizon,
            step,
        )?))
    }

    fn element_set(&self, t: UtcTimestamp) -> Option<Arc<OrbitalElementSet>> {
        let set = self.cache.current()?;
        if set.is_stale_at(t) {
            warn!(
                object = set.name(),
                epoch = %set.epoch(),
                at = %t,
                "Element set is too old for reliable predictions"
            );
        }
        Some(set)
    }
}
