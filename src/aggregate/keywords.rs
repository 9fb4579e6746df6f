use serde::Serialize;

use crate::data::filter::FilteredView;

/// Category name → keywords scanned for in that category.
pub type Taxonomy = [(&'static str, &'static [&'static str])];

/// Technology keywords counted over the filtered listings.
pub const TAXONOMY: &Taxonomy = &[
    (
        "Cloud & DevOps",
        &[
            "AWS", "GCP", "Azure", "Docker", "Kubernetes", "K8s", "CI/CD", "Terraform", "Linux",
            "Jenkins", "Git", "雲端", "虛擬化", "容器", "自動化部署", "微服務",
        ],
    ),
    (
        "Big Data",
        &[
            "Spark", "Hadoop", "Kafka", "Airflow", "Flink", "Hive", "Databricks", "ETL", "大數據",
            "海量資料", "資料倉儲", "Data Warehouse", "資料湖", "Data Lake", "爬蟲", "數據分析",
        ],
    ),
    (
        "Database",
        &[
            "SQL", "NoSQL", "MongoDB", "PostgreSQL", "MySQL", "Redis", "Elasticsearch", "Oracle",
            "MSSQL", "資料庫", "數據庫", "關聯式", "優化", "Stored Procedure",
        ],
    ),
    (
        "AI/ML Frameworks",
        &[
            "PyTorch", "TensorFlow", "Keras", "Scikit-learn", "OpenCV", "LLM", "Transformer",
            "RAG", "YOLO", "HuggingFace", "LangChain", "Bert", "人工智慧", "機器學習", "深度學習",
            "自然語言", "NLP", "電腦視覺", "影像辨識", "演算法", "模型訓練", "生成式",
        ],
    ),
    (
        "Programming & Backend",
        &[
            "Python", "Java", "Scala", "C++", "C#", "Go", "Rust", "JavaScript", "TypeScript",
            "Kotlin", "Swift", "後端", "前端", "全端", "物件導向", "API", "RESTful",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: &'static str,
    pub count: usize,
}

/// Non-zero keyword counts of one taxonomy category, in taxonomy order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub category: &'static str,
    pub counts: Vec<KeywordCount>,
}

impl CategoryCounts {
    /// True when no keyword of the category occurred.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counts ordered for display: highest first, taxonomy order on ties.
    pub fn ranked(&self) -> Vec<KeywordCount> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }
}

/// Lower-cased text rendering of every cell of the view: a header line with
/// the column names, then one line per listing starting with its row index.
/// Missing cells render as `None`. An empty view renders to an empty string.
pub fn corpus_text(view: &FilteredView<'_>) -> String {
    if view.is_empty() {
        return String::new();
    }
    let columns = &view.table().columns;
    let mut lines = Vec::with_capacity(view.len() + 1);
    lines.push(columns.join(" "));
    for (idx, listing) in view.rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| listing.cell(col).to_string())
            .collect();
        lines.push(format!("{idx} {}", cells.join(" ")));
    }
    lines.join("\n").to_lowercase()
}

/// Count non-overlapping, case-insensitive occurrences of every keyword.
/// Keywords that never occur are left out of their category.
pub fn count_keywords(text: &str, taxonomy: &Taxonomy) -> Vec<CategoryCounts> {
    let text = text.to_lowercase();
    taxonomy
        .iter()
        .map(|&(category, keywords)| CategoryCounts {
            category,
            counts: keywords
                .iter()
                .filter_map(|&keyword| {
                    let count = text.matches(keyword.to_lowercase().as_str()).count();
                    (count > 0).then_some(KeywordCount { keyword, count })
                })
                .collect(),
        })
        .collect()
}
