use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{JobListing, JobTable};

// ---------------------------------------------------------------------------
// Filter criteria: the user's current selections
// ---------------------------------------------------------------------------

/// The active constraints for one render pass.
///
/// Each predicate has a neutral value that switches it off:
/// an empty location set, a threshold of `0`, an empty keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    /// Allowed addresses. Empty means no restriction.
    pub locations: BTreeSet<String>,
    /// Minimum average salary. `0` (or less) means no restriction.
    pub min_salary: f64,
    /// Case-insensitive title substring. Empty means no restriction.
    pub keyword: String,
}

impl FilterCriteria {
    fn location_ok(&self, table: &JobTable, listing: &JobListing) -> bool {
        if self.locations.is_empty() || !table.presence.address {
            return true;
        }
        listing
            .address
            .as_ref()
            .is_some_and(|addr| self.locations.contains(addr))
    }

    fn salary_ok(&self, listing: &JobListing) -> bool {
        if self.min_salary <= 0.0 {
            return true;
        }
        match listing.avg_salary {
            Some(salary) => salary >= self.min_salary,
            // Unknown salaries are never filtered out.
            None => true,
        }
    }

    fn keyword_ok(&self, needle: Option<&str>, listing: &JobListing) -> bool {
        let Some(needle) = needle else {
            return true;
        };
        listing
            .title
            .as_ref()
            .is_some_and(|title| title.to_lowercase().contains(needle))
    }

    /// Whether a single listing passes every active predicate.
    pub fn matches(&self, table: &JobTable, listing: &JobListing) -> bool {
        let needle = self.lowered_keyword();
        self.matches_with(table, needle.as_deref(), listing)
    }

    fn matches_with(&self, table: &JobTable, needle: Option<&str>, listing: &JobListing) -> bool {
        self.location_ok(table, listing)
            && self.salary_ok(listing)
            && self.keyword_ok(needle, listing)
    }

    fn lowered_keyword(&self) -> Option<String> {
        (!self.keyword.is_empty()).then(|| self.keyword.to_lowercase())
    }
}

/// Return indices of listings that pass all active filters, in table order.
pub fn filtered_indices(table: &JobTable, criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.lowered_keyword();
    table
        .listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| criteria.matches_with(table, needle.as_deref(), listing))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – the rows of one render pass
// ---------------------------------------------------------------------------

/// A borrowed subset of a [`JobTable`], in table order.
///
/// Every index is checked against the table when the view is built, so the
/// iterators never go out of bounds.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    table: &'a JobTable,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    /// View over `indices`, usually the output of [`filtered_indices`].
    ///
    /// # Panics
    ///
    /// Panics if an index is not a row of `table`. Use
    /// [`FilteredView::try_new`] for indices from elsewhere.
    pub fn new(table: &'a JobTable, indices: &'a [usize]) -> Self {
        match Self::try_new(table, indices) {
            Some(view) => view,
            None => panic!(
                "filtered view index out of range for a table of {} listings",
                table.len()
            ),
        }
    }

    /// View over `indices`, or `None` if any index is not a row of `table`.
    pub fn try_new(table: &'a JobTable, indices: &'a [usize]) -> Option<Self> {
        indices
            .iter()
            .all(|&i| i < table.len())
            .then_some(Self { table, indices })
    }

    pub fn table(&self) -> &'a JobTable {
        self.table
    }

    /// Row indices of the view, in table order.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn listings(&self) -> impl Iterator<Item = &'a JobListing> + 'a {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.listings[i])
    }

    /// (row index, listing) pairs.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &'a JobListing)> + 'a {
        let table = self.table;
        self.indices.iter().map(move |&i| (i, &table.listings[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnPresence;

    fn job(title: Option<&str>, address: Option<&str>, salary: Option<f64>) -> JobListing {
        JobListing {
            title: title.map(Into::into),
            company: Some(format!("{title:?}-{address:?}-{salary:?}")),
            address: address.map(Into::into),
            avg_salary: salary,
            ..Default::default()
        }
    }

    fn table() -> JobTable {
        JobTable::from_listings(
            vec![
                job(Some("Data Engineer"), Some("Taipei"), Some(50000.0)),
                job(Some("Backend Dev"), Some("Taichung"), Some(0.0)),
                job(Some("Senior DATA Scientist"), Some("Taipei"), None),
                job(None, None, Some(90000.0)),
            ],
            ColumnPresence::ALL,
        )
    }

    fn locations(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_neutral_criteria_is_identity() {
        let t = table();
        assert_eq!(
            filtered_indices(&t, &FilterCriteria::default()),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_location_filter() {
        let t = table();
        let criteria = FilterCriteria {
            locations: locations(&["Taipei"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&t, &criteria), vec![0, 2]);
    }

    #[test]
    fn test_location_filter_inactive_without_address_column() {
        let mut t = table();
        t.presence.address = false;
        let criteria = FilterCriteria {
            locations: locations(&["Nowhere"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&t, &criteria).len(), 4);
    }

    #[test]
    fn test_unknown_salary_always_passes() {
        let t = table();
        for threshold in [1.0, 50000.0, 1e12] {
            let criteria = FilterCriteria {
                min_salary: threshold,
                ..Default::default()
            };
            assert!(filtered_indices(&t, &criteria).contains(&2));
        }
    }

    #[test]
    fn test_zero_salary_only_passes_without_threshold() {
        let t = table();
        let criteria = FilterCriteria {
            min_salary: 40000.0,
            ..Default::default()
        };
        assert_eq!(filtered_indices(&t, &criteria), vec![0, 2, 3]);
    }

    #[test]
    fn test_keyword_is_case_insensitive_and_literal() {
        let t = table();
        let criteria = FilterCriteria {
            keyword: "data".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&t, &criteria), vec![0, 2]);

        let criteria = FilterCriteria {
            keyword: "C++".into(),
            ..Default::default()
        };
        assert!(filtered_indices(&t, &criteria).is_empty());
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let t = table();
        let criteria = FilterCriteria {
            locations: locations(&["Taipei", "Taichung"]),
            min_salary: 60000.0,
            keyword: "data".into(),
        };
        assert_eq!(filtered_indices(&t, &criteria), vec![2]);
        assert!(criteria.matches(&t, &t.listings[2]));
        assert!(!criteria.matches(&t, &t.listings[0]));
    }

    #[test]
    fn test_view_preserves_order() {
        let t = table();
        let idx = vec![1, 3];
        let view = FilteredView::new(&t, &idx);
        let rows: Vec<usize> = view.rows().map(|(i, _)| i).collect();
        assert_eq!(rows, vec![1, 3]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.indices(), &[1, 3]);
    }

    #[test]
    fn test_view_rejects_out_of_range_indices() {
        let t = table();
        assert!(FilteredView::try_new(&t, &[0, 4]).is_none());
        assert!(FilteredView::try_new(&t, &[]).is_some());
        assert_eq!(FilteredView::try_new(&t, &[3]).map(|v| v.len()), Some(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_view_new_panics_on_out_of_range_index() {
        let t = table();
        let idx = vec![7];
        FilteredView::new(&t, &idx);
    }
}
