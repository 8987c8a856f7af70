//! Join the raw datasets into playable channel records

use std::collections::HashMap;

use crate::models::*;

/// Normalized catalog, built once after the initial fetch
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub records: Vec<ChannelRecord>,
    pub countries: Vec<FilterOption>,
    pub categories: Vec<FilterOption>,
    category_names: HashMap<String, String>,
}

impl Catalog {
    pub fn build(raw: RawCatalog) -> Self {
        let records = join_channels(&raw);
        log::info!(
            "Processed {} playable channels ({} listed, {} streams)",
            records.len(),
            raw.channels.len(),
            raw.streams.len()
        );

        let category_names = raw
            .categories
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();

        Self {
            records,
            countries: country_options(raw.countries),
            categories: category_options(raw.categories),
            category_names,
        }
    }

    /// Display name for a category id, falling back to the id itself
    pub fn category_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.category_names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Flatten channels with their stream, logo and country.
///
/// Channels without a stream, or flagged NSFW, are dropped. The first stream
/// listed for a channel wins, the last logo wins.
pub fn join_channels(raw: &RawCatalog) -> Vec<ChannelRecord> {
    let mut streams: HashMap<&str, &RawStream> = HashMap::with_capacity(raw.streams.len());
    for stream in &raw.streams {
        if let Some(channel) = stream.channel.as_deref() {
            streams.entry(channel).or_insert(stream);
        }
    }

    let logos: HashMap<&str, &str> = raw
        .logos
        .iter()
        .filter_map(|l| l.channel.as_deref().map(|c| (c, l.url.as_str())))
        .collect();

    let countries: HashMap<&str, &RawCountry> = raw
        .countries
        .iter()
        .map(|c| (c.code.as_str(), c))
        .collect();

    raw.channels
        .iter()
        .filter(|c| !c.is_nsfw)
        .filter_map(|c| {
            let stream = streams.get(c.id.as_str())?;
            let (country_name, flag) = match countries.get(c.country.as_str()) {
                Some(country) => (country.name.clone(), country.flag.clone()),
                None => (c.country.clone(), UNKNOWN_FLAG.to_string()),
            };

            Some(ChannelRecord {
                id: c.id.clone(),
                name: c.name.clone(),
                alt_names: c.alt_names.clone(),
                country_code: c.country.clone(),
                country_name,
                flag,
                category: c
                    .categories
                    .first()
                    .cloned()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                logo: logos.get(c.id.as_str()).map(|url| url.to_string()),
                stream_url: stream.url.clone(),
                website: c.website.clone().filter(|w| !w.trim().is_empty()),
                referrer: stream.referrer.clone(),
                user_agent: stream.user_agent.clone(),
            })
        })
        .collect()
}

/// Placeholder for logos that failed to load
pub const FAILED_LOGO_AVATAR: &str = "https://ui-avatars.com/api/?name=TV&background=334155&color=fff";

/// Logo to show on a card: the channel logo, or a generated avatar
pub fn logo_url(record: &ChannelRecord) -> String {
    match record.logo.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => format!(
            "https://ui-avatars.com/api/?name={}&background=1e293b&color=fff",
            urlencoding::encode(&record.name)
        ),
    }
}

fn country_options(mut countries: Vec<RawCountry>) -> Vec<FilterOption> {
    countries.sort_by_cached_key(|c| c.name.to_lowercase());
    countries
        .into_iter()
        .map(|c| FilterOption {
            label: format!("{} {}", c.flag, c.name).trim().to_string(),
            value: c.code,
        })
        .collect()
}

fn category_options(mut categories: Vec<RawCategory>) -> Vec<FilterOption> {
    categories.sort_by_cached_key(|c| c.name.to_lowercase());
    categories
        .into_iter()
        .map(|c| FilterOption { value: c.id, label: c.name })
        .collect()
}
