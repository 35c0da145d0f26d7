use logdigest_core::model::digest::DailyDigest;
use logdigest_core::model::row::LogRow;

#[derive(Debug, Default)]
pub struct Aggregator {
    digest: DailyDigest,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &LogRow) {
        self.digest.rows_seen += 1;
        let Some(hour) = row.hour() else {
            self.digest.rows_skipped += 1;
            return;
        };

        let aggregate = self.digest.source_mut(&row.source);
        if let Some(level) = row.level() {
            aggregate.record(hour, level, &row.message);
        }
    }

    pub fn extend<'a>(&mut self, rows: impl IntoIterator<Item = &'a LogRow>) {
        for row in rows {
            self.push(row);
        }
    }

    pub fn finish(self) -> DailyDigest {
        self.digest
    }
}

pub fn aggregate(rows: &[LogRow]) -> DailyDigest {
    let mut aggregator = Aggregator::new();
    aggregator.extend(rows);
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use logdigest_core::model::digest::SourceAggregate;
    use proptest::prelude::*;

    use super::*;

    fn row(source: &str, timestamp: &str, severity: i32, message: &str) -> LogRow {
        LogRow {
            timestamp: timestamp.to_string(),
            severity,
            source: source.to_string(),
            message: message.to_string(),
            stack_trace: String::new(),
        }
    }

    #[test]
    fn api_scenario_counts() {
        let rows = vec![
            row("api", "2026-02-01T03:01:00Z", 2, "slow"),
            row("api", "2026-02-01T03:59:00Z", 2, "slow"),
            row("api", "2026-02-01T10:00:00Z", 3, "refused"),
        ];
        let digest = aggregate(&rows);
        let api = &digest.sources["api"];

        assert_eq!(api.hourly_warnings[3], 2);
        assert_eq!(api.hourly_errors[3], 0);
        assert_eq!(api.hourly_warnings[10], 0);
        assert_eq!(api.hourly_errors[10], 1);
        assert_eq!(api.total_warnings(), 2);
        assert_eq!(api.total_errors(), 1);
        assert_eq!(api.warning_frequency["slow"], 2);
        assert_eq!(api.error_frequency["refused"], 1);
    }

    #[test]
    fn garbage_timestamp_changes_nothing() {
        let base = vec![row("api", "2026-02-01T03:00:00Z", 2, "slow")];
        let mut with_garbage = base.clone();
        with_garbage.push(row("api", "not-a-time", 3, "boom"));
        with_garbage.push(row("ghost", "", 2, "never"));

        let expected = aggregate(&base);
        let actual = aggregate(&with_garbage);
        assert_eq!(actual.sources, expected.sources);
        assert_eq!(actual.rows_seen, 3);
        assert_eq!(actual.rows_skipped, 2);
        assert!(!actual.sources.contains_key("ghost"));
    }

    #[test]
    fn other_severities_change_no_table() {
        let rows = [0, 1, 4, 17]
            .into_iter()
            .map(|sev| row("api", "2026-02-01T05:00:00Z", sev, "noise"))
            .collect::<Vec<_>>();
        let digest = aggregate(&rows);

        // The source is still known, with an empty aggregate.
        assert_eq!(digest.sources["api"], SourceAggregate::default());
        assert_eq!(digest.rows_skipped, 0);
    }

    #[test]
    fn sources_are_kept_apart() {
        let rows = vec![
            row("api", "2026-02-01T01:00:00Z", 2, "same"),
            row("web", "2026-02-01T01:00:00Z", 2, "same"),
            row("web", "2026-02-01T02:00:00Z", 3, "other"),
        ];
        let digest = aggregate(&rows);
        assert_eq!(digest.sources.len(), 2);
        assert_eq!(digest.sources["api"].warning_frequency["same"], 1);
        assert_eq!(digest.sources["web"].warning_frequency["same"], 1);
        assert_eq!(digest.sources["web"].hourly_errors[2], 1);
    }

    #[test]
    fn split_then_merge_matches_single_fold() {
        let rows = (0..48)
            .map(|i| {
                row(
                    if i % 3 == 0 { "api" } else { "web" },
                    &format!("2026-02-01T{:02}:00:00Z", i % 24),
                    2 + (i % 2),
                    &format!("m{}", i % 5),
                )
            })
            .collect::<Vec<_>>();

        let whole = aggregate(&rows);
        let mut merged = aggregate(&rows[30..]);
        merged.merge(aggregate(&rows[..30]));
        assert_eq!(merged, whole);
    }

    fn arb_row() -> impl Strategy<Value = LogRow> {
        (
            prop::sample::select(vec!["api", "web", "worker"]),
            prop_oneof![
                (0u32..24).prop_map(|h| format!("2026-02-01T{h:02}:30:00Z")),
                Just("garbage".to_string()),
            ],
            0i32..5,
            prop::sample::select(vec!["a", "b", "c", "d"]),
        )
            .prop_map(|(source, timestamp, severity, message)| {
                row(source, &timestamp, severity, message)
            })
    }

    proptest! {
        #[test]
        fn fold_is_order_independent(
            (rows, shuffled) in prop::collection::vec(arb_row(), 0..60)
                .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
        ) {
            prop_assert_eq!(aggregate(&rows), aggregate(&shuffled));
        }
    }
}
