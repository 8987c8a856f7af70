//! Catalog view state: the filtered view and how much of it is painted.
//!
//! Owned by the app and handed to the UI and playback code by reference.

use crate::batch::BatchCursor;
use crate::catalog::Catalog;
use crate::filter::{self, FilterCriteria};
use crate::models::ChannelRecord;

#[derive(Debug, Default)]
pub struct CatalogView {
    catalog: Catalog,
    criteria: FilterCriteria,
    filtered: Vec<usize>,
    cursor: BatchCursor,
}

impl CatalogView {
    pub fn new(catalog: Catalog) -> Self {
        let mut view = Self {
            catalog,
            ..Default::default()
        };
        view.apply_filters();
        view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replace the criteria. Recomputes only when something changed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> bool {
        if criteria == self.criteria {
            return false;
        }
        self.criteria = criteria;
        self.apply_filters();
        true
    }

    pub fn set_search(&mut self, search: &str) -> bool {
        let criteria = FilterCriteria {
            search: search.to_string(),
            ..self.criteria.clone()
        };
        self.set_criteria(criteria)
    }

    pub fn set_country(&mut self, country: Option<String>) -> bool {
        let criteria = FilterCriteria {
            country,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria)
    }

    pub fn set_category(&mut self, category: Option<String>) -> bool {
        let criteria = FilterCriteria {
            category,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria)
    }

    /// Recompute the filtered view and paint the first batch
    pub fn apply_filters(&mut self) {
        self.filtered = filter::apply(&self.catalog.records, &self.criteria);
        self.cursor.reset();
        self.cursor.next_batch(self.filtered.len());
        log::debug!("Filter {:?} -> {} channels", self.criteria, self.filtered.len());
    }

    /// Paint the next batch; returns how many cards were added
    pub fn load_more(&mut self) -> usize {
        self.cursor.next_batch(self.filtered.len()).len()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more(self.filtered.len())
    }

    pub fn painted(&self) -> impl Iterator<Item = &ChannelRecord> {
        self.filtered[..self.cursor.visible()]
            .iter()
            .map(move |&i| &self.catalog.records[i])
    }

    pub fn painted_count(&self) -> usize {
        self.cursor.visible()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn count_label(&self) -> String {
        format!("{} channels", self.filtered.len())
    }

    pub fn no_results(&self) -> bool {
        self.filtered.is_empty()
    }
}
