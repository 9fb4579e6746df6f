use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::error::LoadError;

/// Name of the source table every loader reads.
pub const TABLE_NAME: &str = "job_listings";

pub const COL_TITLE: &str = "title";
pub const COL_COMPANY: &str = "company";
pub const COL_ADDRESS: &str = "address";
pub const COL_AVG_SALARY: &str = "avg_salary";
pub const COL_SKILLS_TAGS: &str = "skills_tags";
pub const COL_DESCRIPTION: &str = "description";

const KNOWN_COLUMNS: [&str; 6] = [
    COL_TITLE,
    COL_COMPANY,
    COL_ADDRESS,
    COL_AVG_SALARY,
    COL_SKILLS_TAGS,
    COL_DESCRIPTION,
];

/// Whether `name` is one of the columns mapped onto a [`JobListing`] field.
pub fn is_known_column(name: &str) -> bool {
    KNOWN_COLUMNS.contains(&name)
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it comes out of a loader, before it is mapped
/// onto a [`JobListing`] field. Columns the listing does not know about stay
/// in this form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "None"),
        }
    }
}

impl CellValue {
    /// Guess the type of a textual cell. Empty text is treated as missing.
    /// Only used for columns outside the known set; known columns keep
    /// their text as read.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text form of the value, `None` when the cell is missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn from_opt_text(value: &Option<String>) -> Self {
        match value {
            Some(s) => CellValue::String(s.clone()),
            None => CellValue::Null,
        }
    }
}

/// Coerce a raw salary cell to a number. Missing, unparsable and NaN values
/// all become `0.0`.
pub fn normalize_salary(cell: &CellValue) -> f64 {
    match cell.as_f64() {
        Some(v) if !v.is_nan() => v,
        _ => {
            if *cell != CellValue::Null {
                log::debug!("avg_salary {cell:?} is not numeric, using 0");
            }
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// JobListing – one row of the table
// ---------------------------------------------------------------------------

/// One job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    /// `Some(0.0)` for salaries that were missing or unparsable at load time;
    /// `None` means unknown and is never excluded by the salary filter.
    pub avg_salary: Option<f64>,
    /// Tags joined with [`SKILL_DELIMITER`](crate::aggregate::skills::SKILL_DELIMITER).
    pub skills_tags: Option<String>,
    pub description: Option<String>,
    /// Source columns outside the known set, keyed by column name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, CellValue>,
}

impl JobListing {
    /// Cell value for a column name, `Null` when the listing has none.
    pub fn cell(&self, column: &str) -> CellValue {
        match column {
            COL_TITLE => CellValue::from_opt_text(&self.title),
            COL_COMPANY => CellValue::from_opt_text(&self.company),
            COL_ADDRESS => CellValue::from_opt_text(&self.address),
            COL_AVG_SALARY => self.avg_salary.map_or(CellValue::Null, CellValue::Float),
            COL_SKILLS_TAGS => CellValue::from_opt_text(&self.skills_tags),
            COL_DESCRIPTION => CellValue::from_opt_text(&self.description),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Null),
        }
    }

    fn dedup_key(&self) -> (Option<String>, Option<String>) {
        (self.title.clone(), self.company.clone())
    }
}

/// Drop listings whose (title, company) pair was already seen, keeping the
/// first occurrence and the input order.
pub fn dedup_listings(listings: Vec<JobListing>) -> Vec<JobListing> {
    let mut seen = HashSet::with_capacity(listings.len());
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.dedup_key()))
        .collect()
}

// ---------------------------------------------------------------------------
// RawTable – loader output before typing
// ---------------------------------------------------------------------------

/// Rows as read from a source, in source column order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// JobTable – the complete loaded collection
// ---------------------------------------------------------------------------

/// Which optional columns exist in the source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnPresence {
    pub address: bool,
    pub avg_salary: bool,
    pub skills_tags: bool,
    pub description: bool,
}

impl ColumnPresence {
    pub const ALL: ColumnPresence = ColumnPresence {
        address: true,
        avg_salary: true,
        skills_tags: true,
        description: true,
    };

    fn from_columns(columns: &[String]) -> Self {
        let has = |name: &str| columns.iter().any(|c| c == name);
        ColumnPresence {
            address: has(COL_ADDRESS),
            avg_salary: has(COL_AVG_SALARY),
            skills_tags: has(COL_SKILLS_TAGS),
            description: has(COL_DESCRIPTION),
        }
    }
}

/// The deduplicated listing collection. Immutable once built.
#[derive(Debug, Clone)]
pub struct JobTable {
    pub listings: Vec<JobListing>,
    /// Column names in source order.
    pub columns: Vec<String>,
    pub presence: ColumnPresence,
}

impl JobTable {
    /// Type the raw rows, normalize salaries and deduplicate.
    pub fn from_raw(raw: RawTable) -> Result<Self, LoadError> {
        let index_of = |name: &str| raw.columns.iter().position(|c| c == name);
        let title_idx = index_of(COL_TITLE).ok_or(LoadError::MissingColumn(COL_TITLE))?;
        let company_idx = index_of(COL_COMPANY).ok_or(LoadError::MissingColumn(COL_COMPANY))?;
        let address_idx = index_of(COL_ADDRESS);
        let salary_idx = index_of(COL_AVG_SALARY);
        let skills_idx = index_of(COL_SKILLS_TAGS);
        let description_idx = index_of(COL_DESCRIPTION);

        let text_at = |row: &[CellValue], idx: Option<usize>| {
            idx.and_then(|i| row.get(i)).and_then(CellValue::as_text)
        };

        let listings: Vec<JobListing> = raw
            .rows
            .iter()
            .map(|row| {
                let row = row.as_slice();
                let extra = raw
                    .columns
                    .iter()
                    .zip(row.iter())
                    .filter(|(col, _)| !is_known_column(col))
                    .map(|(col, val)| (col.clone(), val.clone()))
                    .collect();
                let salary_cell = salary_idx
                    .and_then(|i| row.get(i))
                    .unwrap_or(&CellValue::Null);
                JobListing {
                    title: text_at(row, Some(title_idx)),
                    company: text_at(row, Some(company_idx)),
                    address: text_at(row, address_idx),
                    avg_salary: Some(normalize_salary(salary_cell)),
                    skills_tags: text_at(row, skills_idx),
                    description: text_at(row, description_idx),
                    extra,
                }
            })
            .collect();

        let presence = ColumnPresence::from_columns(&raw.columns);
        Ok(Self::build(raw.columns, presence, listings))
    }

    /// Build a table from already-typed listings. Columns are the known
    /// columns flagged in `presence` followed by any extra columns in
    /// first-seen order.
    pub fn from_listings(listings: Vec<JobListing>, presence: ColumnPresence) -> Self {
        let mut columns: Vec<String> = vec![COL_TITLE.into(), COL_COMPANY.into()];
        for (present, name) in [
            (presence.address, COL_ADDRESS),
            (presence.avg_salary, COL_AVG_SALARY),
            (presence.skills_tags, COL_SKILLS_TAGS),
            (presence.description, COL_DESCRIPTION),
        ] {
            if present {
                columns.push(name.into());
            }
        }
        for listing in &listings {
            for key in listing.extra.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self::build(columns, presence, listings)
    }

    fn build(columns: Vec<String>, presence: ColumnPresence, listings: Vec<JobListing>) -> Self {
        let total = listings.len();
        let listings = dedup_listings(listings);
        if listings.len() < total {
            log::info!(
                "Dropped {} duplicate listings (same title and company)",
                total - listings.len()
            );
        }
        JobTable {
            listings,
            columns,
            presence,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
