//! Search / country / category filtering

use crate::models::ChannelRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    /// Country code, `None` for all countries
    pub country: Option<String>,
    /// Category id, `None` for all categories
    pub category: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &ChannelRecord) -> bool {
        self.matches_lowered(record, &self.search.to_lowercase())
    }

    fn matches_lowered(&self, record: &ChannelRecord, needle: &str) -> bool {
        self.matches_search(record, needle)
            && self.country.as_deref().map_or(true, |c| record.country_code == c)
            && self.category.as_deref().map_or(true, |c| record.category == c)
    }

    fn matches_search(&self, record: &ChannelRecord, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        record.name.to_lowercase().contains(needle)
            || record.alt_names.join(" ").to_lowercase().contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.country.is_none() && self.category.is_none()
    }
}

/// Indices of the records matching `criteria`, in catalog order
pub fn apply(records: &[ChannelRecord], criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.search.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches_lowered(r, &needle))
        .map(|(i, _)| i)
        .collect()
}
