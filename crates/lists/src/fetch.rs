//! Fetching list files.
//!
//! Blocking reqwest client (no Tokio runtime required).

use std::time::Duration;

use crate::error::ListsError;

/// Source of list file contents, keyed by URL.
pub trait ListFetcher {
    fn fetch(&self, url: &str) -> Result<String, ListsError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ListsError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("modlist/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ListsError::Network(e.to_string()))?;
        Ok(Self { http })
    }
}

impl ListFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ListsError> {
        let response = self.http.get(url)
            .send()
            .map_err(|e| ListsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListsError::Http(status.as_u16(), url.to_string()));
        }

        response.text().map_err(|e| ListsError::Network(e.to_string()))
    }
}
