use serde::Serialize;

use super::skills::{most_frequent, skill_frequencies};
use crate::data::filter::FilteredView;
use crate::data::model::JobTable;

/// The three headline metrics of a render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    /// Mean over listings with a positive salary; `None` when unavailable.
    pub mean_salary: Option<f64>,
    /// Most frequent skill tag; `None` when unavailable.
    pub top_skill: Option<String>,
}

pub fn summarize(view: &FilteredView<'_>) -> Summary {
    Summary {
        count: view.len(),
        mean_salary: mean_salary(view),
        top_skill: top_skill(view),
    }
}

/// Arithmetic mean of the positive salaries in the view.
pub fn mean_salary(view: &FilteredView<'_>) -> Option<f64> {
    let salaries = salary_series(view);
    if salaries.is_empty() {
        return None;
    }
    let mean = salaries.iter().sum::<f64>() / salaries.len() as f64;
    (mean > 0.0 && mean.is_finite()).then_some(mean)
}

/// Most frequent skill tag, `None` if the source has no `skills_tags` column
/// or the view is empty.
pub fn top_skill(view: &FilteredView<'_>) -> Option<String> {
    if !view.table().presence.skills_tags {
        return None;
    }
    let frequencies = skill_frequencies(view.listings());
    most_frequent(&frequencies).map(|s| s.skill.clone())
}

/// Positive salaries of the view, in view order.
pub fn salary_series(view: &FilteredView<'_>) -> Vec<f64> {
    view.listings()
        .filter_map(|l| l.avg_salary)
        .filter(|&s| s > 0.0)
        .collect()
}

/// (min, max) of the positive salaries in the whole table, truncated to
/// whole numbers. Bounds for the salary threshold control.
pub fn salary_bounds(table: &JobTable) -> Option<(i64, i64)> {
    let positive = table
        .listings
        .iter()
        .filter_map(|l| l.avg_salary)
        .filter(|&s| s > 0.0);
    let (min, max) = positive.fold(None, |acc: Option<(f64, f64)>, s| match acc {
        None => Some((s, s)),
        Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
    })?;
    Some((min as i64, max as i64))
}

/// Distinct non-missing addresses in first-seen order.
pub fn location_options(table: &JobTable) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for address in table.listings.iter().filter_map(|l| l.address.as_ref()) {
        if !options.contains(address) {
            options.push(address.clone());
        }
    }
    options
}
