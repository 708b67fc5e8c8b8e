//! Article collections: loading, ingesting raw dumps and exporting.

pub mod export;
pub mod ingest;
mod record;

pub use record::{ArticleRecord, SummaryModel};

use anyhow::Context;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::Result;

/// Lists the `*.json` collection files directly inside `dir`, sorted by name.
pub fn collection_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads one collection file, a JSON array of article records.
///
/// Entries that are not JSON objects are skipped with a warning; objects with
/// missing fields load with empty strings in their place.
pub fn load_records(path: &Path) -> Result<Vec<ArticleRecord>> {
    let entries = read_entries(path)?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            warn!(file = %path.display(), index, "skipping entry that is not an object");
            continue;
        }
        match serde_json::from_value::<ArticleRecord>(entry) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(file = %path.display(), index, error = %err, "skipping malformed record")
            }
        }
    }
    Ok(records)
}

fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))
}

/// Rewrites the collection at `source` into `output` with `model`'s summary
/// taken from `records`, keeping every other key of each entry untouched.
///
/// `records` must come from [`load_records`] on `source`, possibly truncated:
/// the n-th record updates the n-th object entry and object entries past the
/// end of `records` are dropped. Non-object entries cannot carry a summary and
/// are dropped with a warning. Returns the number of entries written.
pub fn write_candidates(
    source: &Path,
    output: &Path,
    records: &[ArticleRecord],
    model: SummaryModel,
) -> Result<usize> {
    let entries = read_entries(source)?;
    let total = entries.len();
    let mut objects: Vec<Map<String, Value>> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(object) => Some(object),
            _ => None,
        })
        .collect();
    if objects.len() < total {
        warn!(
            file = %source.display(),
            dropped = total - objects.len(),
            "dropping entries that are not objects"
        );
    }

    objects.truncate(records.len());
    for (object, record) in objects.iter_mut().zip(records) {
        object.insert(
            model.field_name().to_string(),
            Value::String(record.candidate(model).to_string()),
        );
    }

    let json = serde_json::to_string_pretty(&objects)?;
    fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
    Ok(objects.len())
}

/// Writes records as a pretty-printed JSON array, keeping non-ASCII text unescaped.
pub fn write_records(path: &Path, records: &[ArticleRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
