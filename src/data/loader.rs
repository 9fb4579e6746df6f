use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Row};

use super::error::LoadError;
use super::model::{CellValue, JobTable, RawTable, TABLE_NAME, is_known_column};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the job listing table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.db` / `.sqlite` / `.sqlite3` – SQLite database with a `job_listings` table
/// * `.csv`     – export of the table with a header row
/// * `.json`    – `[{ "title": ..., "company": ..., ... }, ...]`
/// * `.parquet` – export of the table, one column per field
///
/// The returned table is deduplicated and has its salaries normalized.
pub fn load_file(path: &Path) -> Result<JobTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "db" | "sqlite" | "sqlite3" => load_sqlite(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Read {} rows with columns {:?} from {}",
        raw.rows.len(),
        raw.columns,
        path.display()
    );
    let table = JobTable::from_raw(raw)?;
    log::info!("Loaded {} job listings", table.len());
    Ok(table)
}

// ---------------------------------------------------------------------------
// SQLite loader
// ---------------------------------------------------------------------------

/// Read `SELECT * FROM job_listings` from a SQLite file.
///
/// The column list comes from `pragma_table_info`; every column is selected
/// as `CAST(.. AS TEXT)` so that loosely-typed columns (a salary stored as
/// text in some rows and as a number in others) decode uniformly. Known
/// columns keep that text verbatim, empty strings included.
fn load_sqlite(path: &Path) -> Result<RawTable> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting SQLite runtime")?;
    runtime.block_on(read_sqlite_table(path))
}

async fn read_sqlite_table(path: &Path) -> Result<RawTable> {
    let options = SqliteConnectOptions::new().filename(path).read_only(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .with_context(|| format!("opening SQLite database {}", path.display()))?;

    let columns: Vec<String> =
        sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1)")
            .bind(TABLE_NAME)
            .fetch_all(&mut conn)
            .await
            .context("reading table schema")?;
    if columns.is_empty() {
        bail!(LoadError::MissingTable(TABLE_NAME.to_string()));
    }

    let select_list = columns
        .iter()
        .map(|c| format!("CAST({} AS TEXT)", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {select_list} FROM {}", quote_ident(TABLE_NAME));
    let rows = sqlx::query(&sql)
        .fetch_all(&mut conn)
        .await
        .with_context(|| format!("querying {TABLE_NAME}"))?;

    let mut out = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let cells = (0..columns.len())
            .map(|i| {
                row.try_get::<Option<String>, _>(i)
                    .map(|v| v.map_or(CellValue::Null, |text| text_cell(&columns[i], text)))
            })
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("SQLite row {row_no}"))?;
        out.push(cells);
    }

    conn.close().await.context("closing SQLite database")?;
    Ok(RawTable { columns, rows: out })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A cell read as text. Known columns stay strings ("007" is not 7); other
/// columns get a type guess.
fn text_cell(column: &str, text: String) -> CellValue {
    if is_known_column(column) {
        CellValue::String(text)
    } else {
        CellValue::from_text(&text)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Data Engineer", "company": "A", "avg_salary": "50000", ... },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys across records.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one listing per record.
/// Empty fields are read as missing.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .zip(&columns)
                .map(|(field, column)| match field {
                    "" => CellValue::Null,
                    text => text_cell(column, text.to_string()),
                })
                .collect(),
        );
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the table. Every column becomes a table column;
/// string, integer, float and boolean columns keep their type, anything else
/// is rendered to text.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => arrow::util::display::array_value_to_string(col, row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("jobs.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_missing_sqlite_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("absent.db")).is_err());
    }

    #[test]
    fn test_csv_load() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title,company,address,avg_salary,skills_tags").unwrap();
        writeln!(file, "Data Engineer,A,Taipei,50000,\"Python, SQL\"").unwrap();
        writeln!(file, "Data Engineer,A,Taipei,99999,Go").unwrap();
        writeln!(file, "Backend Dev,B,Taichung,,Go").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings[0].avg_salary, Some(50000.0));
        assert_eq!(table.listings[0].skills_tags.as_deref(), Some("Python, SQL"));
        assert_eq!(table.listings[1].avg_salary, Some(0.0));
        assert!(!table.presence.description);
    }

    #[test]
    fn test_csv_keeps_text_columns_verbatim() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title,company,avg_salary,openings").unwrap();
        writeln!(file, "Engineer,007,50000,0012").unwrap();
        writeln!(file, "Engineer,7,60000,12").unwrap();
        writeln!(file, "1e3 Club,A,1e3,").unwrap();
        writeln!(file, "NaN,B,NaN,x").unwrap();
        writeln!(file, "true,C,true,true").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 5);

        let companies: Vec<_> = table.listings.iter().map(|j| j.company.as_deref()).collect();
        assert_eq!(
            companies,
            vec![Some("007"), Some("7"), Some("A"), Some("B"), Some("C")]
        );
        let titles: Vec<_> = table.listings.iter().map(|j| j.title.as_deref()).collect();
        assert_eq!(
            titles,
            vec![
                Some("Engineer"),
                Some("Engineer"),
                Some("1e3 Club"),
                Some("NaN"),
                Some("true")
            ]
        );

        // salary still parses from text
        assert_eq!(table.listings[2].avg_salary, Some(1000.0));
        assert_eq!(table.listings[3].avg_salary, Some(0.0));
        assert_eq!(table.listings[4].avg_salary, Some(0.0));

        // extra columns are still typed
        assert_eq!(table.listings[0].cell("openings"), CellValue::Integer(12));
        assert_eq!(table.listings[2].cell("openings"), CellValue::Null);
        assert_eq!(table.listings[4].cell("openings"), CellValue::Bool(true));
    }

    #[test]
    fn test_parquet_load() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, false),
            Field::new("company", DataType::Utf8, false),
            Field::new("address", DataType::Utf8, true),
            Field::new("avg_salary", DataType::Float64, true),
            Field::new("openings", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![
                    "Data Engineer",
                    "Backend Dev",
                    "Data Engineer",
                    "QA",
                ])),
                Arc::new(StringArray::from(vec!["A", "B", "A", "007"])),
                Arc::new(StringArray::from(vec![
                    Some("Taipei"),
                    Some("Taichung"),
                    Some("Tainan"),
                    None,
                ])),
                Arc::new(Float64Array::from(vec![
                    Some(50000.0),
                    None,
                    Some(99999.0),
                    Some(f64::NAN),
                ])),
                Arc::new(Int64Array::from(vec![Some(3), Some(1), Some(2), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs_data.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.columns,
            vec!["title", "company", "address", "avg_salary", "openings"]
        );
        assert_eq!(table.len(), 3);

        let first = &table.listings[0];
        assert_eq!(first.title.as_deref(), Some("Data Engineer"));
        assert_eq!(first.address.as_deref(), Some("Taipei"));
        assert_eq!(first.avg_salary, Some(50000.0));
        assert_eq!(first.cell("openings"), CellValue::Integer(3));

        assert_eq!(table.listings[1].avg_salary, Some(0.0));
        let qa = &table.listings[2];
        assert_eq!(qa.company.as_deref(), Some("007"));
        assert_eq!(qa.address, None);
        assert_eq!(qa.avg_salary, Some(0.0));
        assert_eq!(qa.cell("openings"), CellValue::Null);
    }

    #[test]
    fn test_json_load_with_missing_keys() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"title": "ML Engineer", "company": "C", "avg_salary": 70000}},
               {{"title": "QA", "company": "D", "address": "Taipei"}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        let mut columns = table.columns.clone();
        columns.sort();
        assert_eq!(columns, vec!["address", "avg_salary", "company", "title"]);
        assert!(table.presence.address);
        assert_eq!(table.listings[0].address, None);
        assert_eq!(table.listings[1].avg_salary, Some(0.0));
    }

    #[test]
    fn test_csv_without_company_fails() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title,address").unwrap();
        writeln!(file, "QA,Taipei").unwrap();
        file.flush().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingColumn("company"))
        ));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("avg_salary"), "\"avg_salary\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
