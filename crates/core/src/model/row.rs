use serde::{Deserialize, Serialize};

use crate::time;

/// One parsed CSV record. The timestamp stays as text: a value that does not
/// parse is a skip at aggregation time, not a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRow {
    pub timestamp: String,
    pub severity: i32,
    pub source: String,
    pub message: String,
    pub stack_trace: String,
}

impl LogRow {
    pub fn hour(&self) -> Option<usize> {
        time::hour_of_day(&self.timestamp)
    }

    pub fn level(&self) -> Option<Level> {
        Level::from_code(self.severity)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Level {
    Warning = 2,
    Error = 3,
}

impl Level {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            2 => Some(Self::Warning),
            3 => Some(Self::Error),
            _ => None,
        }
    }
}
