//! Parsing raw portal dumps into article records.
//!
//! A dump is a plain-text file holding one or more articles. Each article has
//! `KEY: value` header lines (`PORTAL`, `DATUM`, `RUBRIKA`, `NASLOV`, `LINK`)
//! followed by its body. A `<***>` line separates header from body and also
//! separates consecutive articles.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::export::write_csv;
use super::{write_records, ArticleRecord};
use crate::Result;

/// Line that opens an article body or separates two articles.
pub const ARTICLE_MARKER: &str = "<***>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Portal,
    Date,
    Section,
    Title,
    Link,
}

impl Header {
    const PREFIXES: [(&'static str, Header); 5] = [
        ("PORTAL:", Header::Portal),
        ("DATUM:", Header::Date),
        ("RUBRIKA:", Header::Section),
        ("NASLOV:", Header::Title),
        ("LINK:", Header::Link),
    ];

    fn parse(line: &str) -> Option<(Header, &str)> {
        Self::PREFIXES.iter().find_map(|(prefix, header)| {
            line.strip_prefix(prefix).map(|value| (*header, value.trim()))
        })
    }
}

#[derive(Debug, Default)]
struct ArticleDraft {
    record: ArticleRecord,
    has_header: bool,
    body: Vec<String>,
}

impl ArticleDraft {
    fn set(&mut self, header: Header, value: &str) {
        let slot = match header {
            Header::Portal => &mut self.record.portal,
            Header::Date => &mut self.record.date,
            Header::Section => &mut self.record.category,
            Header::Title => &mut self.record.title,
            Header::Link => &mut self.record.url,
        };
        *slot = value.to_string();
        self.has_header = true;
    }

    fn finish(mut self) -> ArticleRecord {
        self.record.original_text = self.body.join("\n").trim().to_string();
        self.record
    }
}

/// Parses one dump into records.
///
/// Articles without a `LINK` are dropped. Kept articles get ids
/// `{base_id}_{k}` with `k` counting from 1 in file order.
pub fn parse_dump(content: &str, base_id: &str) -> Vec<ArticleRecord> {
    let mut drafts = Vec::new();
    let mut current = ArticleDraft::default();

    for line in content.lines().map(str::trim) {
        if let Some((header, value)) = Header::parse(line) {
            if !current.body.is_empty() {
                drafts.push(std::mem::take(&mut current));
            }
            current.set(header, value);
        } else if line.starts_with(ARTICLE_MARKER) {
            if !current.body.is_empty() {
                drafts.push(std::mem::take(&mut current));
            }
        } else if current.has_header && (!line.is_empty() || !current.body.is_empty()) {
            current.body.push(line.to_string());
        }
    }
    if current.has_header {
        drafts.push(current);
    }

    drafts
        .into_iter()
        .map(ArticleDraft::finish)
        .filter(|record| !record.url.is_empty())
        .enumerate()
        .map(|(index, mut record)| {
            record.id = format!("{}_{}", base_id, index + 1);
            record
        })
        .collect()
}

/// Parses every `*.txt` dump in one category directory, in file-name order.
pub fn ingest_category(category_dir: &Path) -> Result<Vec<ArticleRecord>> {
    let mut files: Vec<PathBuf> = fs::read_dir(category_dir)
        .with_context(|| format!("reading {}", category_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut articles = Vec::new();
    for path in files {
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let base_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse_dump(&content, &base_id);
        debug!(file = %path.display(), articles = parsed.len(), "parsed dump");
        articles.extend(parsed);
    }
    Ok(articles)
}

/// Ingests every category directory under `root`, writing
/// `{prefix}_{category}_RA.json` and `.csv` into `output_dir`.
///
/// Returns `(category, article_count)` for each category that produced output.
pub fn ingest(root: &Path, output_dir: &Path, prefix: &str) -> Result<Vec<(String, usize)>> {
    let mut categories: Vec<PathBuf> = fs::read_dir(root)
        .with_context(|| format!("reading {}", root.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    categories.sort();

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut written = Vec::new();
    for category_dir in categories {
        let category = category_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let articles = ingest_category(&category_dir)?;
        if articles.is_empty() {
            continue;
        }

        let stem = format!("{}_{}_RA", prefix, category);
        write_records(&output_dir.join(format!("{stem}.json")), &articles)?;
        write_csv(&output_dir.join(format!("{stem}.csv")), &articles, false)?;

        info!(category = %category, articles = articles.len(), "processed category");
        written.push((category, articles.len()));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
PORTAL: buka.ba
DATUM: 12.03.2024.
RUBRIKA: Vijesti
NASLOV: Prvi naslov
LINK: https://example.ba/1
<***>
Prvi pasus teksta.

Drugi pasus teksta.
<***>
PORTAL: buka.ba
DATUM: 13.03.2024.
RUBRIKA: Vijesti
NASLOV: Bez linka
<***>
Ovaj clanak nema link.
PORTAL: buka.ba
RUBRIKA: Kultura
NASLOV: Treci naslov
LINK: https://example.ba/3
<***>
Tekst treceg clanka.
";

    #[test]
    fn test_parse_dump_fields_and_body() {
        let articles = parse_dump(DUMP, "dump");
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.portal, "buka.ba");
        assert_eq!(first.date, "12.03.2024.");
        assert_eq!(first.category, "Vijesti");
        assert_eq!(first.title, "Prvi naslov");
        assert_eq!(first.url, "https://example.ba/1");
        assert_eq!(first.original_text, "Prvi pasus teksta.\n\nDrugi pasus teksta.");
        assert_eq!(first.reference_summary, "");
    }

    #[test]
    fn test_articles_without_link_are_dropped_and_ids_stay_dense() {
        let articles = parse_dump(DUMP, "dump");
        let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["dump_1", "dump_2"]);
        assert_eq!(articles[1].category, "Kultura");
        assert_eq!(articles[1].original_text, "Tekst treceg clanka.");
    }

    #[test]
    fn test_marker_before_headers() {
        let dump = "<***>\nLINK: https://a\nNASLOV: A\nTekst A.\n<***>\nLINK: https://b\nTekst B.\n";
        let articles = parse_dump(dump, "x");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].original_text, "Tekst A.");
        assert_eq!(articles[1].url, "https://b");
        assert_eq!(articles[1].original_text, "Tekst B.");
    }

    #[test]
    fn test_preamble_and_empty_input_ignored() {
        assert!(parse_dump("", "x").is_empty());
        assert!(parse_dump("just some text\nwithout headers", "x").is_empty());
    }

    #[test]
    fn test_ingest_writes_json_and_csv_per_category() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let vijesti = root.path().join("Vijesti");
        fs::create_dir(&vijesti).unwrap();
        fs::write(vijesti.join("dump.txt"), DUMP).unwrap();
        fs::create_dir(root.path().join("Prazno")).unwrap();

        let written = ingest(root.path(), out.path(), "buka").unwrap();
        assert_eq!(written, vec![("Vijesti".to_string(), 2)]);

        let json = out.path().join("buka_Vijesti_RA.json");
        let csv_path = out.path().join("buka_Vijesti_RA.csv");
        assert_eq!(crate::dataset::load_records(&json).unwrap().len(), 2);

        let csv_text = fs::read_to_string(csv_path).unwrap();
        assert!(csv_text.starts_with("portal,kategorija,id,url,datum,naslov,tekst,"));
        assert!(!out.path().join("buka_Prazno_RA.json").exists());
    }
}
