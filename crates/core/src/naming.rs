use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::day_stamp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ArtifactKind {
    Summary,
    Warnings,
    Errors,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Summary, Self::Warnings, Self::Errors];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Warnings => "warnings",
            Self::Errors => "errors",
        }
    }
}

pub fn input_filter(input_prefix: &str, day: NaiveDate) -> String {
    format!("{input_prefix}{}_", day_stamp(day))
}

pub fn artifact_name(
    output_prefix: &str,
    day: NaiveDate,
    source: &str,
    kind: ArtifactKind,
) -> String {
    format!(
        "{output_prefix}{}_{source}_{}.csv",
        day_stamp(day),
        kind.suffix()
    )
}

/// True when `name` is one of the reports a run for `day` writes under
/// `output_prefix`. Needed when the output and input prefixes overlap.
pub fn is_artifact_name(output_prefix: &str, day: NaiveDate, name: &str) -> bool {
    let Some(rest) = name.strip_prefix(output_prefix) else {
        return false;
    };
    let Some(rest) = rest.strip_prefix(&format!("{}_", day_stamp(day))) else {
        return false;
    };
    ArtifactKind::ALL.iter().any(|kind| {
        rest.strip_suffix(&format!("_{}.csv", kind.suffix()))
            .is_some_and(|source| !source.is_empty())
    })
}
