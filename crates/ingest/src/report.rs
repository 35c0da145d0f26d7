use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;
use logdigest_core::model::digest::{HOURS_PER_DAY, SourceAggregate, TopMessageEntry};
use logdigest_core::naming::{ArtifactKind, artifact_name};

pub const TOP_MESSAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub body: String,
}

pub fn top_messages(frequency: &HashMap<String, u64>, limit: usize) -> Vec<TopMessageEntry> {
    let mut entries = frequency
        .iter()
        .map(|(message, count)| TopMessageEntry {
            message: message.clone(),
            count: *count,
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
    entries.truncate(limit);
    entries
}

pub fn render_hourly(aggregate: &SourceAggregate) -> String {
    let mut out = String::from("Hour,Warnings,Errors\n");
    for hour in 0..HOURS_PER_DAY {
        let _ = writeln!(
            out,
            "{hour},{},{}",
            aggregate.hourly_warnings[hour], aggregate.hourly_errors[hour]
        );
    }
    out
}

pub fn render_top_messages(entries: &[TopMessageEntry]) -> String {
    let mut out = String::from("Message,Count\n");
    for entry in entries {
        let _ = writeln!(out, "{},{}", quote(&entry.message), entry.count);
    }
    out
}

pub fn render_source(
    output_prefix: &str,
    day: NaiveDate,
    source: &str,
    aggregate: &SourceAggregate,
) -> Vec<Artifact> {
    ArtifactKind::ALL
        .into_iter()
        .map(|kind| {
            let body = match kind {
                ArtifactKind::Summary => render_hourly(aggregate),
                ArtifactKind::Warnings => render_top_messages(&top_messages(
                    &aggregate.warning_frequency,
                    TOP_MESSAGES,
                )),
                ArtifactKind::Errors => {
                    render_top_messages(&top_messages(&aggregate.error_frequency, TOP_MESSAGES))
                }
            };
            Artifact {
                name: artifact_name(output_prefix, day, source, kind),
                body,
            }
        })
        .collect()
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
