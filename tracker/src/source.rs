//! Where the raw catalog text comes from

use crate::units::Time;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read catalog file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build the HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("Failed to fetch catalog from '{url}'")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Catalog request to '{url}' returned HTTP {status}")]
    Status { url: Url, status: u16 },
}

/// Retrieval collaborator, returns the whole catalog body
pub trait CatalogSource {
    fn fetch(&self) -> Result<String, SourceError>;

    /// Human readable origin, for logs
    fn origin(&self) -> String;
}

impl<S: CatalogSource + ?Sized> CatalogSource for Box<S> {
    fn fetch(&self) -> Result<String, SourceError> {
        (**self).fetch()
    }

    fn origin(&self) -> String {
        (**self).origin()
    }
}

#[derive(Clone, Debug)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch(&self) -> Result<String, SourceError> {
        debug!(path = %self.path.display(), "Reading catalog file");
        fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Clone, Debug)]
pub struct HttpCatalogSource {
    url: Url,
    client: reqwest::blocking::Client,
}

impl HttpCatalogSource {
    pub const DEFAULT_TIMEOUT: Time = Time::from_secs(5.0);

    pub fn new(url: Url, timeout: Time) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs_f64(timeout.as_secs().max(0.0)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> Result<String, SourceError> {
        debug!(url = %self.url, "Fetching catalog");
        let transport = |source| SourceError::Transport {
            url: self.url.clone(),
            source,
        };
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "Catalog request failed");
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(transport)
    }

    fn origin(&self) -> String {
        self.url.to_string()
    }
}
