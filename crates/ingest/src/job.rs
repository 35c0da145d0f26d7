use chrono::NaiveDate;
use futures::StreamExt;
use futures::stream;
use logdigest_core::config::{ColumnMapping, Config, MalformedInputPolicy};
use logdigest_core::error::{DigestError, Result};
use logdigest_core::model::digest::DailyDigest;
use logdigest_core::model::summary::RunSummary;
use logdigest_core::naming::{input_filter, is_artifact_name};
use logdigest_store::{ObjectName, Store};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::decode::decode_rows;
use crate::report::render_source;

#[derive(Debug, Clone)]
pub struct JobSettings {
    pub input_prefix: String,
    pub output_prefix: String,
    pub fetch_concurrency: usize,
    pub malformed_input: MalformedInputPolicy,
    pub columns: ColumnMapping,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            input_prefix: String::new(),
            output_prefix: logdigest_core::config::DEFAULT_OUTPUT_PREFIX.to_string(),
            fetch_concurrency: logdigest_core::config::DEFAULT_FETCH_CONCURRENCY,
            malformed_input: MalformedInputPolicy::Abort,
            columns: ColumnMapping::default(),
        }
    }
}

impl From<&Config> for JobSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            input_prefix: cfg.input_prefix.clone(),
            output_prefix: cfg.output_prefix.clone(),
            fetch_concurrency: cfg.fetch_concurrency,
            malformed_input: cfg.malformed_input,
            columns: cfg.columns.clone(),
        }
    }
}

// Every input is parsed before the first upload, so an aborted run leaves no
// artifacts behind.
#[derive(Clone)]
pub struct DigestJob {
    store: Store,
    settings: JobSettings,
}

impl DigestJob {
    pub fn new(store: Store, settings: JobSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn run(&self, day: NaiveDate) -> Result<RunSummary> {
        let span = info_span!("digest_run", run_id = %Uuid::new_v4(), %day);
        self.run_inner(day).instrument(span).await
    }

    async fn run_inner(&self, day: NaiveDate) -> Result<RunSummary> {
        let filter = input_filter(&self.settings.input_prefix, day);
        let names = self
            .store
            .list(&filter)
            .await?
            .into_iter()
            .filter(|object| {
                let own = is_artifact_name(&self.settings.output_prefix, day, object.name());
                if own {
                    tracing::debug!(file = object.name(), "ignoring previously written report");
                }
                !own
            })
            .collect::<Vec<_>>();
        if names.is_empty() {
            info!(prefix = %filter, store = self.store.location(), "no input files found");
            return Err(DigestError::NoInputFound(filter));
        }
        info!(files = names.len(), prefix = %filter, "digesting input files");

        let mut outcomes = stream::iter(names)
            .map(|name| async move {
                let outcome = self.digest_file(&name).await;
                (name, outcome)
            })
            .buffer_unordered(self.settings.fetch_concurrency.max(1));

        let mut digest = DailyDigest::default();
        let mut files_read = Vec::new();
        let mut files_skipped = Vec::new();
        while let Some((name, outcome)) = outcomes.next().await {
            match outcome {
                Ok(partial) => {
                    digest.merge(partial);
                    files_read.push(name.name().to_string());
                }
                Err(err @ DigestError::MalformedInput { .. })
                    if self.settings.malformed_input == MalformedInputPolicy::Skip =>
                {
                    warn!(error = %err, "skipping malformed input file");
                    files_skipped.push(name.name().to_string());
                }
                Err(err) => return Err(err),
            }
        }
        drop(outcomes);
        files_read.sort();
        files_skipped.sort();

        let mut artifacts = Vec::new();
        for (source, aggregate) in &digest.sources {
            for artifact in render_source(&self.settings.output_prefix, day, source, aggregate) {
                self.store.upload(&artifact.name, artifact.body).await?;
                artifacts.push(artifact.name);
            }
        }

        info!(
            sources = digest.sources.len(),
            rows = digest.rows_seen,
            skipped_rows = digest.rows_skipped,
            artifacts = artifacts.len(),
            "digest run complete"
        );

        Ok(RunSummary {
            day,
            files_read,
            files_skipped,
            rows_seen: digest.rows_seen,
            rows_skipped: digest.rows_skipped,
            sources: digest.sources.len(),
            artifacts,
        })
    }

    async fn digest_file(&self, object: &ObjectName) -> Result<DailyDigest> {
        let body = self.store.download(object).await?;
        let rows = decode_rows(object.name(), &body, &self.settings.columns)?;
        tracing::debug!(file = object.name(), rows = rows.len(), "parsed input file");
        Ok(aggregate(&rows))
    }
}
