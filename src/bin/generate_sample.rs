use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;

const COLUMNS: [&str; 6] = [
    "title",
    "company",
    "address",
    "avg_salary",
    "skills_tags",
    "description",
];

/// One generated row; every field is text, as scraped.
type Row = [Option<String>; 6];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let titles = [
        "Data Engineer",
        "Data Scientist",
        "Backend Engineer",
        "AI Engineer",
        "DevOps Engineer",
        "資料分析師",
        "Frontend Developer",
    ];
    let companies = ["Acme", "Formosa Tech", "Pacific Data", "Jade Cloud", "Lotus AI"];
    let addresses = ["台北市", "新北市", "新竹市", "台中市", "高雄市"];
    let skills = [
        "Python", "SQL", "Go", "Java", "Docker", "Linux", "Spark", "PyTorch", "NA", "不拘",
    ];
    let phrases = [
        "Build ETL pipelines with Spark and Airflow.",
        "Deploy services on AWS with Docker and Kubernetes.",
        "熟悉 Python 與 SQL，具備資料庫優化經驗。",
        "Train LLM and RAG systems with PyTorch.",
        "Maintain RESTful API in Go and Rust.",
        "負責雲端微服務與 CI/CD 自動化部署。",
        "Design MySQL and Redis data models.",
    ];

    let mut rows = Vec::new();
    for title in titles {
        for company in companies {
            if rng.below(3) == 0 {
                continue;
            }
            let salary = match rng.below(8) {
                0 => None,
                1 => Some("面議".to_string()),
                _ => Some((35_000 + 1_000 * rng.below(60)).to_string()),
            };
            let n_skills = 1 + rng.below(3);
            let tags: Vec<&str> = (0..n_skills).map(|_| rng.pick(&skills)).collect();
            let description = format!("{} {}", rng.pick(&phrases), rng.pick(&phrases));
            let address = (rng.below(10) != 0).then(|| rng.pick(&addresses).to_string());

            rows.push([
                Some(title.to_string()),
                Some(company.to_string()),
                address,
                salary,
                Some(tags.join(", ")),
                Some(description),
            ]);
        }
    }

    // A few re-posted listings to exercise deduplication.
    let reposts: Vec<Row> = rows.iter().step_by(5).cloned().collect();
    rows.extend(reposts);
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|col| {
            let values: Vec<Option<&str>> = rows.iter().map(|r| r[col].as_deref()).collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

async fn write_sqlite(path: &Path, rows: &[Row]) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path).context("removing previous database")?;
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .context("creating SQLite database")?;

    sqlx::query(
        "CREATE TABLE job_listings (
            title TEXT, company TEXT, address TEXT,
            avg_salary TEXT, skills_tags TEXT, description TEXT
        )",
    )
    .execute(&mut conn)
    .await?;

    let mut tx = conn.begin().await?;
    for row in rows {
        let mut insert = sqlx::query(
            "INSERT INTO job_listings
             (title, company, address, avg_salary, skills_tags, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        );
        for value in row {
            insert = insert.bind(value.clone());
        }
        insert.execute(&mut *tx).await?;
    }
    tx.commit().await?;
    conn.close().await?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(write_sqlite(Path::new("job.db"), &rows))?;
    write_csv(Path::new("jobs_data.csv"), &rows)?;
    write_parquet(Path::new("jobs_data.parquet"), &rows)?;

    println!(
        "Wrote {} job listings to job.db, jobs_data.csv and jobs_data.parquet",
        rows.len()
    );
    Ok(())
}
