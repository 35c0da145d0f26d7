use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use chrono::NaiveDate;
use logdigest_core::error::{DigestError, ErrorKind, Result};
use logdigest_core::model::summary::RunSummary;
use logdigest_core::time::{parse_day, today_utc};
use logdigest_ingest::DigestJob;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Level;

#[derive(Debug, Default, Deserialize)]
pub struct SummarizeParams {
    pub date: Option<String>,
}

pub fn router(job: DigestJob) -> Router {
    Router::new()
        .route("/api/summarize", get(summarize).post(summarize))
        .route("/healthz", get(healthz))
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(job)
}

pub async fn serve(listener: TcpListener, job: DigestJob) -> anyhow::Result<()> {
    axum::serve(listener, router(job)).await?;
    Ok(())
}

async fn summarize(
    State(job): State<DigestJob>,
    Query(params): Query<SummarizeParams>,
) -> (StatusCode, String) {
    let outcome = match requested_day(params.date.as_deref()) {
        Ok(day) => job.run(day).await.map(|summary| (day, summary)),
        Err(err) => Err(err),
    };
    trigger_response(outcome)
}

async fn healthz() -> &'static str {
    "ok"
}

fn requested_day(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_day(raw),
        None => Ok(today_utc()),
    }
}

pub fn trigger_response(outcome: Result<(NaiveDate, RunSummary)>) -> (StatusCode, String) {
    match outcome {
        Ok((day, summary)) => (
            StatusCode::OK,
            format!(
                "Log summary for {day} completed: {} sources, {} artifacts written",
                summary.sources,
                summary.artifacts.len()
            ),
        ),
        Err(err) => {
            let status = status_for(err.kind());
            if status.is_server_error() {
                tracing::error!(error = %err, "summarize trigger failed");
            } else {
                tracing::info!(error = %err, "summarize trigger found nothing to do");
            }
            (status, failure_text(&err).to_string())
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NoInputFound => StatusCode::NOT_FOUND,
        ErrorKind::ConfigurationMissing
        | ErrorKind::Config
        | ErrorKind::MalformedInput
        | ErrorKind::StorageUnavailable
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_text(err: &DigestError) -> &'static str {
    match err.kind() {
        ErrorKind::NoInputFound => "No logs found for the requested day",
        _ => "Log summary failed",
    }
}
