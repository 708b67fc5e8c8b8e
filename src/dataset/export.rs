//! CSV export of article collections.

use anyhow::Context;
use csv::{QuoteStyle, WriterBuilder};
use std::path::Path;

use super::{load_records, ArticleRecord};
use crate::Result;

/// Writes records as CSV with a header row in dataset column order.
pub fn write_csv(path: &Path, records: &[ArticleRecord], quote_all: bool) -> Result<()> {
    let quote_style = if quote_all {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };
    let mut writer = WriterBuilder::new()
        .quote_style(quote_style)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Collapses line breaks into spaces and trims, so each record fits on one CSV line.
pub fn flatten_text(value: &str) -> String {
    value.replace(['\n', '\r'], " ").trim().to_string()
}

/// Converts a JSON collection into a fully quoted single-line-per-record CSV file.
///
/// Returns the number of records written.
pub fn export_csv(input: &Path, output: &Path) -> Result<usize> {
    let mut records = load_records(input)?;
    for record in &mut records {
        record.map_fields(flatten_text);
    }
    write_csv(output, &records, true)?;
    Ok(records.len())
}
