use rig_schema::PadId;

use crate::CompileError;

pub(crate) const HEADER: [&str; 3] = ["beat_index", "time_s", "pad"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BeatRow {
    pub(crate) line: usize,
    pub(crate) beat_index: i64,
    pub(crate) time_s: f64,
    pub(crate) pad: PadId,
}

pub(crate) fn parse_rows(src: &str) -> Result<Vec<BeatRow>, CompileError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(csv_error)?,
        None => return Err(CompileError::new("E1001", "missing header row", 1)),
    };
    let header_line = record_line(&header);
    let normalized: Vec<String> = header.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
    if normalized != HEADER {
        return Err(CompileError::new(
            "E1001",
            format!("header must be {}", HEADER.join(",")),
            header_line,
        )
        .with_context(header.iter().collect::<Vec<_>>().join(",")));
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(csv_error)?;
        let line = record_line(&record);

        // Short rows are padding in hand-edited beatmaps; skip them.
        if record.len() < 3 {
            continue;
        }

        let beat_index = record[0].parse::<i64>().map_err(|e| {
            CompileError::new("E1002", format!("invalid beat_index: {e}"), line)
                .with_column(1)
                .with_context(record[0].to_string())
        })?;

        let time_s = record[1].parse::<f64>().map_err(|e| {
            CompileError::new("E1003", format!("invalid time_s: {e}"), line)
                .with_column(2)
                .with_context(record[1].to_string())
        })?;
        if !time_s.is_finite() {
            return Err(CompileError::new("E3001", "time_s must be finite", line)
                .with_column(2)
                .with_beat(beat_index));
        }

        let raw_pad = record[2].parse::<u8>().map_err(|e| {
            CompileError::new("E1004", format!("invalid pad: {e}"), line)
                .with_column(3)
                .with_context(record[2].to_string())
        })?;
        let pad = PadId::new(raw_pad).ok_or_else(|| {
            CompileError::new("E1005", format!("pad out of range 1..=8: {raw_pad}"), line)
                .with_column(3)
                .with_beat(beat_index)
        })?;

        rows.push(BeatRow {
            line,
            beat_index,
            time_s,
            pad,
        });
    }

    Ok(rows)
}

fn record_line(record: &csv::StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

fn csv_error(e: csv::Error) -> CompileError {
    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
    CompileError::new("E1006", format!("malformed csv: {e}"), line)
}
