//! Data models for the IPTV catalog
//!
//! `Raw*` types mirror the JSON served by the iptv-org API. `ChannelRecord` is
//! the flattened view the rest of the application works with.

use serde::{Deserialize, Serialize};

/// Category assigned when a channel lists none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Flag shown for channels whose country is not in `countries.json`
pub const UNKNOWN_FLAG: &str = "🌍";

/// UI Tab selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Channels,
    Console,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChannel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_nsfw: bool,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStream {
    #[serde(default)]
    pub channel: Option<String>,
    pub url: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLogo {
    #[serde(default)]
    pub channel: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCountry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub flag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCategory {
    pub id: String,
    pub name: String,
}

/// The five datasets as they come off the wire
#[derive(Debug, Clone, Default)]
pub struct RawCatalog {
    pub channels: Vec<RawChannel>,
    pub streams: Vec<RawStream>,
    pub logos: Vec<RawLogo>,
    pub countries: Vec<RawCountry>,
    pub categories: Vec<RawCategory>,
}

/// A playable channel: joined with its stream, logo and country.
///
/// Only built for channels that have a stream and are not flagged NSFW.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    pub alt_names: Vec<String>,
    pub country_code: String,
    pub country_name: String,
    pub flag: String,
    pub category: String,
    pub logo: Option<String>,
    pub stream_url: String,
    pub website: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl ChannelRecord {
    /// Last path segment of the stream URL, used in player window titles
    pub fn stream_file(&self) -> &str {
        self.stream_url
            .split('?')
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .unwrap_or("stream")
    }
}

/// Option shown in the country / category dropdowns
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}
