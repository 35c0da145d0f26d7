use csv::{ReaderBuilder, StringRecord, Trim};
use logdigest_core::config::ColumnMapping;
use logdigest_core::error::{DigestError, Result};
use logdigest_core::model::row::LogRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses one CSV log file. `name` only labels errors.
///
/// The header decides column order. Any missing mapped column, ragged row or
/// non-integer severity fails the whole file; timestamps are left unparsed.
pub fn decode_rows(name: &str, body: &[u8], columns: &ColumnMapping) -> Result<Vec<LogRow>> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| DigestError::malformed(name, format!("unreadable header: {e}")))?
        .clone();
    let index = ColumnIndex::resolve(&headers, columns)
        .map_err(|missing| DigestError::malformed(name, format!("missing column {missing}")))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DigestError::malformed(name, e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let severity_raw = field(&record, index.severity);
        let severity = severity_raw.trim().parse::<i32>().map_err(|_| {
            DigestError::malformed(
                name,
                format!("line {line}: severity {severity_raw:?} is not an integer"),
            )
        })?;

        rows.push(LogRow {
            timestamp: field(&record, index.timestamp).to_string(),
            severity,
            source: field(&record, index.source).to_string(),
            message: field(&record, index.message).to_string(),
            stack_trace: field(&record, index.stack_trace).to_string(),
        });
    }
    Ok(rows)
}

struct ColumnIndex {
    timestamp: usize,
    severity: usize,
    source: usize,
    message: usize,
    stack_trace: usize,
}

impl ColumnIndex {
    fn resolve(
        headers: &StringRecord,
        columns: &ColumnMapping,
    ) -> std::result::Result<Self, String> {
        let find = |wanted: &str| {
            let wanted_norm = wanted.trim().to_lowercase();
            headers
                .iter()
                .position(|h| h.trim().to_lowercase() == wanted_norm)
                .ok_or_else(|| wanted.to_string())
        };

        Ok(Self {
            timestamp: find(&columns.timestamp)?,
            severity: find(&columns.severity)?,
            source: find(&columns.source)?,
            message: find(&columns.message)?,
            stack_trace: find(&columns.stack_trace)?,
        })
    }
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}
