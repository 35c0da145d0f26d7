mod output;
mod server;
mod telemetry;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use logdigest_core::config::{Config, ConfigOverrides};
use logdigest_core::error::DigestError;
use logdigest_core::time::{parse_day, today_utc};
use logdigest_ingest::{DigestJob, JobSettings};
use logdigest_store::Store;

use crate::output::{RunReport, print_json, print_no_input_human, print_summary_human};
use crate::telemetry::{init_tracing, shutdown_tracing};

const EXIT_NO_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "logdigest")]
#[command(about = "Daily per-source warning and error digests from exported log files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    container: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Digest one day's logs and exit")]
    Run {
        #[arg(long, help = "Day to digest as YYYY-MM-DD (default: today, UTC)")]
        date: Option<String>,
        #[arg(long)]
        input_prefix: Option<String>,
        #[arg(long)]
        output_prefix: Option<String>,
        #[arg(long)]
        concurrency: Option<usize>,
        #[arg(long, help = "Skip unparsable files instead of aborting")]
        skip_malformed: bool,
    },
    #[command(about = "Serve the HTTP trigger, optionally on a schedule")]
    Serve {
        #[arg(long)]
        http_addr: Option<String>,
        #[arg(long, help = "Also run every interval, e.g. 24h")]
        schedule_every: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut overrides = ConfigOverrides {
        container: cli.container,
        ..ConfigOverrides::default()
    };

    match cli.command {
        Commands::Run {
            date,
            input_prefix,
            output_prefix,
            concurrency,
            skip_malformed,
        } => {
            init_tracing("warn");
            overrides.input_prefix = input_prefix;
            overrides.output_prefix = output_prefix;
            overrides.fetch_concurrency = concurrency;
            if skip_malformed {
                overrides.malformed_input = Some("skip".to_string());
            }
            let cfg = Config::load_with(overrides).context("load configuration")?;
            let day = match date {
                Some(raw) => parse_day(&raw)?,
                None => today_utc(),
            };
            let outcome = run_once(&cfg, day, cli.json).await;
            shutdown_tracing();
            outcome
        }
        Commands::Serve {
            http_addr,
            schedule_every,
        } => {
            init_tracing("info");
            overrides.http_addr = http_addr;
            overrides.schedule_every = schedule_every;
            let cfg = Config::load_with(overrides).context("load configuration")?;
            run_serve(cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_job(cfg: &Config) -> anyhow::Result<DigestJob> {
    let store = Store::open(&cfg.storage_connection, &cfg.container)
        .with_context(|| format!("open storage container {}", cfg.container))?;
    Ok(DigestJob::new(store, JobSettings::from(cfg)))
}

async fn run_once(cfg: &Config, day: NaiveDate, json: bool) -> anyhow::Result<ExitCode> {
    let job = open_job(cfg)?;
    match job.run(day).await {
        Ok(summary) => {
            if json {
                print_json(&RunReport::Completed(&summary))?;
            } else {
                print_summary_human(&summary);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(DigestError::NoInputFound(prefix)) => {
            if json {
                print_json(&RunReport::NoInput {
                    day,
                    prefix: &prefix,
                })?;
            } else {
                print_no_input_human(day, &prefix);
            }
            Ok(ExitCode::from(EXIT_NO_INPUT))
        }
        Err(err) => Err(err).with_context(|| format!("digest run for {day} failed")),
    }
}

async fn run_serve(cfg: Config) -> anyhow::Result<()> {
    let job = open_job(&cfg)?;
    let addr: SocketAddr = cfg
        .http_addr
        .parse()
        .with_context(|| format!("invalid http_addr {}", cfg.http_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind trigger listener on {addr}"))?;

    eprintln!("logdigest serve");
    eprintln!("  store: {}", job.store().location());
    eprintln!("  trigger: http://{addr}/api/summarize");
    match cfg.schedule_every {
        Some(every) => eprintln!("  schedule: every {}", humantime::format_duration(every)),
        None => eprintln!("  schedule: off"),
    }

    let server_task = tokio::spawn(server::serve(listener, job.clone()));
    let schedule_task = cfg
        .schedule_every
        .map(|every| tokio::spawn(run_schedule(job, every)));

    tokio::select! {
        res = server_task => {
            res.context("trigger server task failed")??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    if let Some(task) = schedule_task {
        task.abort();
    }
    shutdown_tracing();
    Ok(())
}

async fn run_schedule(job: DigestJob, every: Duration) {
    let start = tokio::time::Instant::now() + every;
    let mut interval = tokio::time::interval_at(start, every);
    loop {
        interval.tick().await;
        match job.run(today_utc()).await {
            Ok(summary) => tracing::info!(
                day = %summary.day,
                artifacts = summary.artifacts.len(),
                "scheduled digest complete"
            ),
            Err(DigestError::NoInputFound(prefix)) => {
                tracing::info!(%prefix, "scheduled digest found no input");
            }
            Err(err) => tracing::warn!(error = ?err, "scheduled digest failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "logdigest",
            "run",
            "--date",
            "2026-02-01",
            "--concurrency",
            "8",
            "--skip-malformed",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Run {
                date,
                concurrency,
                skip_malformed,
                ..
            } => {
                assert_eq!(date.as_deref(), Some("2026-02-01"));
                assert_eq!(concurrency, Some(8));
                assert!(skip_malformed);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_global_container() {
        let cli = Cli::try_parse_from([
            "logdigest",
            "serve",
            "--container",
            "applogs",
            "--schedule-every",
            "24h",
        ])
        .unwrap();
        assert_eq!(cli.container.as_deref(), Some("applogs"));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                schedule_every: Some(ref v),
                ..
            } if v == "24h"
        ));
    }
}
