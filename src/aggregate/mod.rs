//! Aggregations over a filtered view: headline metrics, skill tag
//! frequencies, and technology keyword counts.

pub mod keywords;
pub mod skills;
pub mod summary;
