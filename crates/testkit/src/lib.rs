use chrono::NaiveDate;

pub const HEADER: [&str; 5] = [
    "timestamp [UTC]",
    "severityLevel",
    "cloud_RoleName",
    "message",
    "details",
];

#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: String,
    pub severity: String,
    pub source: String,
    pub message: String,
    pub details: String,
}

impl LogLine {
    pub fn new(source: &str, hour: u32, severity: i32, message: &str) -> Self {
        Self {
            timestamp: timestamp_at(hour),
            severity: severity.to_string(),
            source: source.to_string(),
            message: message.to_string(),
            details: String::new(),
        }
    }

    pub fn warning(source: &str, hour: u32, message: &str) -> Self {
        Self::new(source, hour, 2, message)
    }

    pub fn error(source: &str, hour: u32, message: &str) -> Self {
        Self::new(source, hour, 3, message)
    }

    pub fn info(source: &str, hour: u32, message: &str) -> Self {
        Self::new(source, hour, 1, message)
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn with_severity(mut self, severity: &str) -> Self {
        self.severity = severity.to_string();
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = details.to_string();
        self
    }
}

pub fn sample_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

pub fn timestamp_at(hour: u32) -> String {
    format!("2026-02-01T{hour:02}:15:00.000Z")
}

pub fn render_csv(lines: &[LogLine]) -> Vec<u8> {
    let rows = lines
        .iter()
        .map(|l| {
            vec![
                l.timestamp.clone(),
                l.severity.clone(),
                l.source.clone(),
                l.message.clone(),
                l.details.clone(),
            ]
        })
        .collect::<Vec<_>>();
    render_csv_with_header(&HEADER, &rows)
}

pub fn render_csv_with_header(header: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(header).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.into_inner().unwrap()
}

pub fn api_scenario() -> Vec<LogLine> {
    vec![
        LogLine::warning("api", 3, "slow response"),
        LogLine::warning("api", 3, "slow response"),
        LogLine::error("api", 10, "upstream refused connection")
            .with_details("System.Net.Sockets.SocketException"),
    ]
}
