use crate::{
    report::{DisplayZone, InvalidDisplayZone},
    source::{CatalogSource, FileCatalogSource, HttpCatalogSource, SourceError},
    units::{Angle, Time},
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use track_types::prelude::ObserverLocation;
use url::Url;

pub const DEFAULT_OBJECT_NAME: &str = "ISS (ZARYA)";
pub const DEFAULT_CATALOG_URL: &str = "https://celestrak.org/NORAD/elements/stations.txt";
pub const DEFAULT_REFRESH_INTERVAL: &str = "1h";
pub const DEFAULT_FETCH_TIMEOUT: &str = "5s";
/// New Delhi
pub const DEFAULT_OBSERVER: ObserverLocation = ObserverLocation {
    latitude_deg: 28.7041,
    longitude_deg: 77.1025,
    elevation_m: 0.0,
};
pub const DEFAULT_PASS_DAYS: u32 = 2;
pub const PASS_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=7;
pub const DEFAULT_SEARCH_STEP: &str = "1m";
pub const DEFAULT_TRACK_HORIZON: &str = "90m";
pub const DEFAULT_TRACK_STEP: &str = "5m";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid catalog URL '{0}'")]
    Url(String, #[source] url::ParseError),
    #[error("Observer latitude {0} is outside of [-90, 90]")]
    Latitude(f64),
    #[error("Observer longitude {0} is outside of [-180, 180]")]
    Longitude(f64),
    #[error("Observer elevation {0} m is not a finite number")]
    Elevation(f64),
    #[error("Prediction window of {0} days is outside of [1, 7]")]
    Days(u32),
    #[error("Pass horizon {0}° is outside of [-90, 90]")]
    Horizon(f64),
    #[error("Invalid duration '{value}' for '{key}'")]
    Duration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("'{0}' must be longer than zero")]
    ZeroDuration(&'static str),
    #[error(transparent)]
    Timezone(#[from] InvalidDisplayZone),
}

/// The on-disk configuration, every key optional
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub object_name: Option<String>,
    pub catalog_url: Option<Url>,
    /// Takes precedence over the URL when set
    pub catalog_file: Option<PathBuf>,
    pub refresh_interval: Option<String>,
    pub fetch_timeout: Option<String>,
    /// "local", "utc" or a fixed offset like "+05:30"
    pub timezone: Option<String>,
    pub observer: Observer,
    pub passes: Passes,
    pub track: Track,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Observer {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// [m]
    pub elevation: Option<f64>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Passes {
    pub days: Option<u32>,
    pub search_step: Option<String>,
    /// Minimum elevation [deg]
    pub horizon: Option<f64>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Track {
    pub horizon: Option<String>,
    pub step: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum SourceSettings {
    File(PathBuf),
    Http { url: Url, timeout: Time },
}

/// Fully resolved and validated configuration
#[derive(Clone, PartialEq, Debug)]
pub struct Settings {
    pub object_name: String,
    pub source: SourceSettings,
    pub refresh_interval: Time,
    pub display_zone: DisplayZone,
    pub observer: ObserverLocation,
    pub pass_days: u32,
    pub search_step: Time,
    pub pass_horizon: Angle,
    pub track_horizon: Time,
    pub track_step: Time,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    /// Parse and make sure the result resolves to valid [`Settings`]
    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.settings()?;
        Ok(cfg)
    }

    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let source = match (&self.catalog_file, &self.catalog_url) {
            (Some(path), _) => SourceSettings::File(path.clone()),
            (None, url) => SourceSettings::Http {
                url: match url {
                    Some(u) => u.clone(),
                    None => parse_url(DEFAULT_CATALOG_URL)?,
                },
                timeout: positive_duration(
                    "fetch-timeout",
                    self.fetch_timeout.as_deref().unwrap_or(DEFAULT_FETCH_TIMEOUT),
                )?,
            },
        };

        let display_zone = match self.timezone.as_deref() {
            Some(tz) => tz.parse()?,
            None => DisplayZone::default(),
        };

        let observer = validate_observer(
            self.observer.latitude.unwrap_or(DEFAULT_OBSERVER.latitude_deg),
            self.observer.longitude.unwrap_or(DEFAULT_OBSERVER.longitude_deg),
            self.observer.elevation.unwrap_or(DEFAULT_OBSERVER.elevation_m),
        )?;

        let pass_horizon = self.passes.horizon.unwrap_or(0.0);
        if !(-90.0..=90.0).contains(&pass_horizon) {
            return Err(ConfigError::Horizon(pass_horizon));
        }

        Ok(Settings {
            object_name: self
                .object_name
                .clone()
                .unwrap_or_else(|| DEFAULT_OBJECT_NAME.to_owned()),
            source,
            refresh_interval: positive_duration(
                "refresh-interval",
                self.refresh_interval
                    .as_deref()
                    .unwrap_or(DEFAULT_REFRESH_INTERVAL),
            )?,
            display_zone,
            observer,
            pass_days: validate_days(self.passes.days.unwrap_or(DEFAULT_PASS_DAYS))?,
            search_step: positive_duration(
                "passes.search-step",
                self.passes.search_step.as_deref().unwrap_or(DEFAULT_SEARCH_STEP),
            )?,
            pass_horizon: Angle::from_degrees(pass_horizon),
            track_horizon: duration(
                "track.horizon",
                self.track.horizon.as_deref().unwrap_or(DEFAULT_TRACK_HORIZON),
            )?,
            track_step: positive_duration(
                "track.step",
                self.track.step.as_deref().unwrap_or(DEFAULT_TRACK_STEP),
            )?,
        })
    }
}

impl Settings {
    pub fn catalog_source(&self) -> Result<Box<dyn CatalogSource>, SourceError> {
        let source: Box<dyn CatalogSource> = match &self.source {
            SourceSettings::File(path) => Box::new(FileCatalogSource::new(path)),
            SourceSettings::Http { url, timeout } => {
                Box::new(HttpCatalogSource::new(url.clone(), *timeout)?)
            }
        };
        Ok(source)
    }
}

pub fn validate_observer(
    latitude_deg: f64,
    longitude_deg: f64,
    elevation_m: f64,
) -> Result<ObserverLocation, ConfigError> {
    if !(-90.0..=90.0).contains(&latitude_deg) {
        return Err(ConfigError::Latitude(latitude_deg));
    }
    if !(-180.0..=180.0).contains(&longitude_deg) {
        return Err(ConfigError::Longitude(longitude_deg));
    }
    if !elevation_m.is_finite() {
        return Err(ConfigError::Elevation(elevation_m));
    }
    Ok(ObserverLocation::new(latitude_deg, longitude_deg, elevation_m))
}

pub fn validate_days(days: u32) -> Result<u32, ConfigError> {
    if PASS_DAYS_RANGE.contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Days(days))
    }
}

fn parse_url(s: &str) -> Result<Url, ConfigError> {
    Url::parse(s).map_err(|e| ConfigError::Url(s.to_owned(), e))
}

/// humantime duration string, e.g. "90m" or "1h 30m"
pub fn duration(key: &'static str, value: &str) -> Result<Time, ConfigError> {
    humantime::parse_duration(value)
        .map(Time::from_std_duration)
        .map_err(|source| ConfigError::Duration {
            key,
            value: value.to_owned(),
            source,
        })
}

pub fn positive_duration(key: &'static str, value: &str) -> Result<Time, ConfigError> {
    let d = duration(key, value)?;
    if d.as_secs() > 0.0 {
        Ok(d)
    } else {
        Err(ConfigError::ZeroDuration(key))
    }
}
