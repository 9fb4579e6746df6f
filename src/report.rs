use std::io::{self, Write};

use crate::data::model::{COL_ADDRESS, COL_AVG_SALARY, COL_COMPANY, COL_TITLE, JobListing};
use crate::state::DashboardView;

/// Columns of the compact result table, when present in the source.
const DISPLAY_COLUMNS: [&str; 4] = [COL_TITLE, COL_COMPANY, COL_AVG_SALARY, COL_ADDRESS];

const RULE: &str = "-----";

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Render one pass of the dashboard as plain text.
pub fn write_text<W: Write>(out: &mut W, view: &DashboardView<'_>) -> io::Result<()> {
    writeln!(out, "Job analysis dashboard")?;
    writeln!(out, "Exploring {} job opportunities", view.total_listings)?;
    writeln!(out)?;

    filter_section(out, view)?;
    metrics_section(out, view)?;
    writeln!(out, "{RULE}")?;

    if view.listings.is_empty() {
        writeln!(out, "No jobs found with current filters")?;
    } else {
        writeln!(out, "Displaying {} jobs", view.listings.len())?;
        let columns: Vec<&str> = DISPLAY_COLUMNS
            .iter()
            .copied()
            .filter(|c| view.columns.iter().any(|vc| vc == c))
            .collect();
        write_table(out, &columns, &view.listings)?;
    }

    if view.detailed {
        writeln!(out)?;
        writeln!(out, "Detailed listings")?;
        let columns: Vec<&str> = view.columns.iter().map(String::as_str).collect();
        write_table(out, &columns, &view.listings)?;
    }

    writeln!(out)?;
    writeln!(out, "Top skills")?;
    for skill in &view.skill_chart {
        writeln!(out, "  {:<24} {}", skill.skill, skill.count)?;
    }

    writeln!(out)?;
    writeln!(out, "Average salary distribution")?;
    let series: Vec<String> = view.salary_series.iter().map(|s| format!("{s:.0}")).collect();
    writeln!(out, "  {}", series.join(", "))?;

    writeln!(out)?;
    writeln!(out, "Deep dive: tech stack analysis")?;
    writeln!(out, "Scanned {} units", view.scanned_chars)?;
    for category in &view.category_counts {
        writeln!(out, "[{}]", category.category)?;
        if category.is_empty() {
            writeln!(out, "  No matching keywords in this category")?;
            continue;
        }
        for kw in category.ranked() {
            writeln!(out, "  {:<24} {}", kw.keyword, kw.count)?;
        }
    }
    Ok(())
}

fn filter_section<W: Write>(out: &mut W, view: &DashboardView<'_>) -> io::Result<()> {
    let criteria = view.criteria;
    let locations = if criteria.locations.is_empty() {
        "all".to_string()
    } else {
        criteria
            .locations
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    writeln!(out, "Locations: {locations}")?;
    match view.salary_bounds {
        Some((lo, hi)) => writeln!(
            out,
            "Min monthly salary (NTD): {:.0}  [range {lo} - {hi}]",
            criteria.min_salary
        )?,
        None => writeln!(out, "Min monthly salary (NTD): {:.0}", criteria.min_salary)?,
    }
    if !criteria.keyword.is_empty() {
        writeln!(out, "Title keyword: {}", criteria.keyword)?;
    }
    writeln!(out, "Result: {} jobs found", view.summary.count)?;
    writeln!(out)
}

fn metrics_section<W: Write>(out: &mut W, view: &DashboardView<'_>) -> io::Result<()> {
    let summary = &view.summary;
    writeln!(out, "Total jobs found: {} ({} items)", summary.count, summary.count)?;
    match summary.mean_salary {
        Some(mean) => writeln!(out, "Average monthly salary: {} NTD", mean as i64)?,
        None => writeln!(out, "Average salary: N/A")?,
    }
    match &summary.top_skill {
        Some(skill) => writeln!(out, "Top demand skill: {skill}"),
        None => writeln!(out, "Top demand skill: N/A"),
    }
}

/// Left-aligned table sized to the widest cell of each column.
fn write_table<W: Write>(out: &mut W, columns: &[&str], rows: &[&JobListing]) -> io::Result<()> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|l| columns.iter().map(|c| l.cell(c).to_string()).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(columns.to_vec()))?;
    for row in &cells {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

/// Write the whole view as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, view: &DashboardView<'_>) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, view)?;
    writeln!(out).map_err(serde_json::Error::io)
}
