use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::row::Level;

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceAggregate {
    pub hourly_warnings: [u64; HOURS_PER_DAY],
    pub hourly_errors: [u64; HOURS_PER_DAY],
    pub warning_frequency: HashMap<String, u64>,
    pub error_frequency: HashMap<String, u64>,
}

impl SourceAggregate {
    pub fn record(&mut self, hour: usize, level: Level, message: &str) {
        let (hourly, frequency) = match level {
            Level::Warning => (&mut self.hourly_warnings, &mut self.warning_frequency),
            Level::Error => (&mut self.hourly_errors, &mut self.error_frequency),
        };
        hourly[hour] += 1;
        match frequency.get_mut(message) {
            Some(count) => *count += 1,
            None => {
                frequency.insert(message.to_string(), 1);
            }
        }
    }

    pub fn merge(&mut self, other: SourceAggregate) {
        for hour in 0..HOURS_PER_DAY {
            self.hourly_warnings[hour] += other.hourly_warnings[hour];
            self.hourly_errors[hour] += other.hourly_errors[hour];
        }
        for (message, count) in other.warning_frequency {
            *self.warning_frequency.entry(message).or_insert(0) += count;
        }
        for (message, count) in other.error_frequency {
            *self.error_frequency.entry(message).or_insert(0) += count;
        }
    }

    pub fn total_warnings(&self) -> u64 {
        self.hourly_warnings.iter().sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.hourly_errors.iter().sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyDigest {
    pub sources: BTreeMap<String, SourceAggregate>,
    pub rows_seen: u64,
    pub rows_skipped: u64,
}

impl DailyDigest {
    pub fn source_mut(&mut self, source: &str) -> &mut SourceAggregate {
        self.sources.entry(source.to_string()).or_default()
    }

    pub fn merge(&mut self, other: DailyDigest) {
        self.rows_seen += other.rows_seen;
        self.rows_skipped += other.rows_skipped;
        for (source, aggregate) in other.sources {
            match self.sources.get_mut(&source) {
                Some(existing) => existing.merge(aggregate),
                None => {
                    self.sources.insert(source, aggregate);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopMessageEntry {
    pub message: String,
    pub count: u64,
}
