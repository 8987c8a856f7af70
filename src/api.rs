//! iptv-org API client
//!
//! The directory is published as five static JSON files. They are fetched in
//! parallel, one scoped thread each, and the load fails as a whole if any of
//! them cannot be fetched or decoded.

use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::models::*;

pub const DEFAULT_API_BASE: &str = "https://iptv-org.github.io/api";

pub const CHANNELS: &str = "channels.json";
pub const STREAMS: &str = "streams.json";
pub const LOGOS: &str = "logos.json";
pub const COUNTRIES: &str = "countries.json";
pub const CATEGORIES: &str = "categories.json";

// channels.json alone is well past ureq's default 10 MB body limit
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

pub struct CatalogClient {
    base: String,
    user_agent: String,
    agent: ureq::Agent,
}

impl CatalogClient {
    pub fn new(base: &str, timeout_secs: u64) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .timeout_connect(Some(Duration::from_secs(30)))
            .max_idle_connections(8)
            .max_idle_connections_per_host(5)
            .build()
            .new_agent();

        Self {
            base: base.trim_end_matches('/').to_string(),
            user_agent: format!("iptv_catalog/{}", env!("CARGO_PKG_VERSION")),
            agent,
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        if !user_agent.trim().is_empty() {
            self.user_agent = user_agent.to_string();
        }
        self
    }

    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base, resource)
    }

    fn fetch_text(&self, resource: &'static str) -> Result<String, CatalogError> {
        let url = self.resource_url(resource);
        log::debug!("GET {}", url);

        let mut response = self
            .agent
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => CatalogError::Status { resource, status },
                other => CatalogError::Http { resource, source: Box::new(other) },
            })?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| CatalogError::Read { resource, source: Box::new(e) })
    }

    fn fetch_json<T: DeserializeOwned>(&self, resource: &'static str) -> Result<Vec<T>, CatalogError> {
        let body = self.fetch_text(resource)?;
        let items = parse_resource(resource, &body)?;
        log::info!("Fetched {} ({} entries)", resource, items.len());
        Ok(items)
    }

    /// Fetch all five datasets concurrently
    pub fn fetch_all(&self) -> Result<RawCatalog, CatalogError> {
        thread::scope(|s| {
            let channels = s.spawn(|| self.fetch_json::<RawChannel>(CHANNELS));
            let streams = s.spawn(|| self.fetch_json::<RawStream>(STREAMS));
            let logos = s.spawn(|| self.fetch_json::<RawLogo>(LOGOS));
            let countries = s.spawn(|| self.fetch_json::<RawCountry>(COUNTRIES));
            let categories = s.spawn(|| self.fetch_json::<RawCategory>(CATEGORIES));

            Ok(RawCatalog {
                channels: channels.join().map_err(|_| CatalogError::Worker(CHANNELS))??,
                streams: streams.join().map_err(|_| CatalogError::Worker(STREAMS))??,
                logos: logos.join().map_err(|_| CatalogError::Worker(LOGOS))??,
                countries: countries.join().map_err(|_| CatalogError::Worker(COUNTRIES))??,
                categories: categories.join().map_err(|_| CatalogError::Worker(CATEGORIES))??,
            })
        })
    }
}

/// Decode a JSON array resource
pub fn parse_resource<T: DeserializeOwned>(resource: &'static str, body: &str) -> Result<Vec<T>, CatalogError> {
    serde_json::from_str(body).map_err(|source| CatalogError::Decode { resource, source })
}
