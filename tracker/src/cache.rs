//! Shared, read-mostly cache of the tracked object's element set.
//!
//! The clock is passed in by the caller, which keeps the expiry policy testable.

use crate::{
    source::{CatalogSource, SourceError},
    units::Time,
};
use catalog::{find_element_set, ElementSetError, OrbitalElementSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};
use track_types::prelude::UtcTimestamp;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Element source is unavailable")]
    Source(#[from] SourceError),
    #[error("Element source returned unusable data")]
    ElementSet(#[from] ElementSetError),
}

/// What a call to [`ElementSetCache::refresh_if_expired`] did
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Cached value is younger than the refresh interval, nothing fetched
    Fresh,
    Refreshed,
    /// Fetch failed, the previous value stays in place
    KeptStale(RefreshError),
    /// Fetch failed and there is nothing to fall back on
    Unavailable(RefreshError),
}

impl RefreshOutcome {
    pub fn error(&self) -> Option<&RefreshError> {
        match self {
            RefreshOutcome::KeptStale(e) | RefreshOutcome::Unavailable(e) => Some(e),
            RefreshOutcome::Fresh | RefreshOutcome::Refreshed => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    value: Arc<OrbitalElementSet>,
    fetched_at: UtcTimestamp,
}

#[derive(Debug)]
pub struct ElementSetCache<S> {
    source: S,
    object_name: String,
    ttl: Time,
    entry: RwLock<Option<Entry>>,
}

impl<S: CatalogSource> ElementSetCache<S> {
    pub const DEFAULT_TTL: Time = Time::from_secs(3600.0);

    pub fn new<N: Into<String>>(source: S, object_name: N, ttl: Time) -> Self {
        Self {
            source,
            object_name: object_name.into(),
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// The cached element set, `None` until the first successful refresh
    pub fn current(&self) -> Option<Arc<OrbitalElementSet>> {
        self.read().as_ref().map(|e| e.value.clone())
    }

    pub fn fetched_at(&self) -> Option<UtcTimestamp> {
        self.read().as_ref().map(|e| e.fetched_at)
    }

    pub fn is_expired(&self, now: UtcTimestamp) -> bool {
        match self.read().as_ref() {
            Some(e) => Time::between(e.fetched_at, now) >= self.ttl,
            None => true,
        }
    }

    /// Fetch, parse and validate a new element set if the cached one is
    /// missing or older than the refresh interval.
    ///
    /// A failed attempt leaves the previous value and its fetch time alone, so
    /// the next call retries.
    pub fn refresh_if_expired(&self, now: UtcTimestamp) -> RefreshOutcome {
        if !self.is_expired(now) {
            return RefreshOutcome::Fresh;
        }

        // Fetch outside of the lock, readers keep going meanwhile
        match self.load() {
            Ok(set) => {
                info!(
                    object = set.name(),
                    epoch = %set.epoch(),
                    origin = %self.source.origin(),
                    "Refreshed element set"
                );
                *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(Entry {
                    value: Arc::new(set),
                    fetched_at: now,
                });
                RefreshOutcome::Refreshed
            }
            Err(e) if self.current().is_some() => {
                warn!(
                    object = %self.object_name,
                    error = %e,
                    "Element set refresh failed, keeping the cached one"
                );
                RefreshOutcome::KeptStale(e)
            }
            Err(e) => {
                warn!(
                    object = %self.object_name,
                    error = %e,
                    "Element set refresh failed, tracking is unavailable"
                );
                RefreshOutcome::Unavailable(e)
            }
        }
    }

    fn load(&self) -> Result<OrbitalElementSet, RefreshError> {
        let text = self.source.fetch()?;
        debug!(bytes = text.len(), origin = %self.source.origin(), "Fetched catalog");
        Ok(find_element_set(&text, &self.object_name)?)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Entry>> {
        self.entry.read().unwrap_or_else(PoisonError::into_inner)
    }
}
