use std::sync::Arc;

use serde::Serialize;

use crate::aggregate::keywords::{CategoryCounts, TAXONOMY, corpus_text, count_keywords};
use crate::aggregate::skills::{SkillCount, skill_chart, skill_frequencies};
use crate::aggregate::summary::{
    Summary, location_options, salary_bounds, salary_series, summarize,
};
use crate::data::filter::{FilterCriteria, FilteredView, filtered_indices};
use crate::data::model::{JobListing, JobTable};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full control state, independent of rendering.
pub struct DashboardState {
    /// Cached listing table, shared read-only.
    pub table: Arc<JobTable>,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Indices of listings passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Whether the full-column table is shown.
    pub detailed: bool,
}

impl DashboardState {
    /// Start with the default control values: every location selected, the
    /// salary threshold at the lowest positive salary, no keyword.
    pub fn new(table: Arc<JobTable>) -> Self {
        let locations = if table.presence.address {
            location_options(&table).into_iter().collect()
        } else {
            Default::default()
        };
        let min_salary = salary_bounds(&table).map_or(0.0, |(min, _)| min as f64);

        let mut state = Self {
            table,
            criteria: FilterCriteria {
                locations,
                min_salary,
                keyword: String::new(),
            },
            visible_indices: Vec::new(),
            detailed: false,
        };
        state.refilter();
        state
    }

    /// Recompute `visible_indices` after a criteria change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.table, &self.criteria);
        log::debug!(
            "{} of {} listings visible",
            self.visible_indices.len(),
            self.table.len()
        );
    }

    /// Toggle a single location in the selection.
    pub fn toggle_location(&mut self, location: &str) {
        if !self.criteria.locations.remove(location) {
            self.criteria.locations.insert(location.to_string());
        }
        self.refilter();
    }

    /// Replace the location selection.
    pub fn set_locations<I, S>(&mut self, locations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.locations = locations.into_iter().map(Into::into).collect();
        self.refilter();
    }

    /// Select every known location.
    pub fn select_all_locations(&mut self) {
        self.set_locations(location_options(&self.table));
    }

    /// Clear the location selection, which lifts the location restriction.
    pub fn select_no_locations(&mut self) {
        self.criteria.locations.clear();
        self.refilter();
    }

    pub fn set_min_salary(&mut self, min_salary: f64) {
        self.criteria.min_salary = min_salary;
        self.refilter();
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.criteria.keyword = keyword.into();
        self.refilter();
    }

    pub fn set_detailed(&mut self, detailed: bool) {
        self.detailed = detailed;
    }

    pub fn filtered(&self) -> FilteredView<'_> {
        FilteredView::new(&self.table, &self.visible_indices)
    }

    /// Run every aggregation over the visible listings.
    pub fn view(&self) -> DashboardView<'_> {
        let filtered = self.filtered();
        let text = corpus_text(&filtered);
        let skill_chart = if self.table.presence.skills_tags {
            skill_chart(&skill_frequencies(filtered.listings()))
        } else {
            Vec::new()
        };

        DashboardView {
            total_listings: self.table.len(),
            criteria: &self.criteria,
            detailed: self.detailed,
            columns: &self.table.columns,
            listings: filtered.listings().collect(),
            summary: summarize(&filtered),
            skill_chart,
            salary_series: salary_series(&filtered),
            scanned_chars: text.chars().count(),
            category_counts: count_keywords(&text, TAXONOMY),
            salary_bounds: salary_bounds(&self.table),
            location_options: location_options(&self.table),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard view – everything one render pass shows
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub total_listings: usize,
    pub criteria: &'a FilterCriteria,
    pub detailed: bool,
    pub columns: &'a [String],
    pub listings: Vec<&'a JobListing>,
    pub summary: Summary,
    pub skill_chart: Vec<SkillCount>,
    pub salary_series: Vec<f64>,
    pub scanned_chars: usize,
    pub category_counts: Vec<CategoryCounts>,
    pub salary_bounds: Option<(i64, i64)>,
    pub location_options: Vec<String>,
}
