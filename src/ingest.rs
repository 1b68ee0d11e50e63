use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ReportError, Result, RowError};
use crate::record::{RawSale, SalesRecord, REQUIRED_COLUMNS};

/// A row left out of the record set, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based data row index, header excluded.
    pub row: usize,
    pub reason: RowError,
}

#[derive(Debug, Default)]
pub struct Ingested {
    pub records: Vec<SalesRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Load a sales CSV from disk.
///
/// A missing or unreadable file is fatal. Malformed rows are not: they are
/// dropped and reported in [`Ingested::skipped`].
pub fn load_sales(path: &Path) -> Result<Ingested> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    if let Some(ext @ ("xlsx" | "xls")) = extension.as_deref() {
        return Err(ReportError::UnsupportedFormat(ext.to_owned()));
    }

    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    let ingested = read_sales(BufReader::new(file))?;
    info!(
        path = %path.display(),
        records = ingested.records.len(),
        skipped = ingested.skipped.len(),
        "loaded sales data"
    );
    Ok(ingested)
}

/// Parse sales rows from any reader.
pub fn read_sales<R: Read>(input: R) -> Result<Ingested> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        debug!("empty sales input");
        return Ok(Ingested::default());
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::MissingColumns(missing));
    }

    let mut ingested = Ingested::default();
    for (idx, result) in reader.deserialize::<RawSale>().enumerate() {
        let row = idx + 1;
        let parsed = match result {
            Ok(raw) => SalesRecord::from_raw(raw),
            Err(e) => Err(RowError::Malformed(e.to_string())),
        };

        match parsed {
            Ok(record) => ingested.records.push(record),
            Err(reason) => {
                warn!(row, %reason, "skipping sales row");
                ingested.skipped.push(SkippedRow { row, reason });
            }
        }
    }

    Ok(ingested)
}
