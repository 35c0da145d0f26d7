use chrono::NaiveDate;
use logdigest_core::model::summary::RunSummary;
use owo_colors::OwoColorize;
use serde::Serialize;

pub fn print_summary_human(v: &RunSummary) {
    println!("DIGEST {} sources={}", v.day, v.sources);
    println!(
        "files read={} skipped={}",
        v.files_read.len(),
        v.files_skipped.len()
    );
    for name in &v.files_skipped {
        println!("  {} {name}", "skipped".yellow());
    }
    println!("rows seen={} skipped={}", v.rows_seen, v.rows_skipped);
    for artifact in &v.artifacts {
        println!("  {} {artifact}", "wrote".green());
    }
    println!("-- {} artifacts written --", v.artifacts.len());
}

pub fn print_no_input_human(day: NaiveDate, prefix: &str) {
    println!("no logs found for {day} (prefix={prefix})");
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunReport<'a> {
    Completed(&'a RunSummary),
    NoInput { day: NaiveDate, prefix: &'a str },
}

pub fn print_json(report: &RunReport<'_>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
