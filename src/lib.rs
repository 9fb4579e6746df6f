//! jobscope: load a table of job listings once, filter it by location,
//! salary floor and title keyword, and summarize what is left.

pub mod aggregate;
pub mod cli;
pub mod data;
pub mod report;
pub mod state;
