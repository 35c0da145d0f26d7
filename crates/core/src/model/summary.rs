use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub day: NaiveDate,
    pub files_read: Vec<String>,
    pub files_skipped: Vec<String>,
    pub rows_seen: u64,
    pub rows_skipped: u64,
    pub sources: usize,
    pub artifacts: Vec<String>,
}
