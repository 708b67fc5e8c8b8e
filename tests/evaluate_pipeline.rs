//! End-to-end evaluation runs over temporary collections with a stub scorer.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use rust_summary_eval::eval::{run_evaluation, ScorePair, SemanticScorer, SCORECARD_HEADER};
use rust_summary_eval::{EvalConfig, EvalError, Result};

/// Scores pairs by position so misrouted scores show up in the output.
struct PositionScorer {
    calls: Cell<usize>,
}

impl PositionScorer {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }
}

impl SemanticScorer for PositionScorer {
    fn batch_score(&self, pairs: &[ScorePair]) -> Result<Vec<f32>> {
        self.calls.set(self.calls.get() + 1);
        Ok((0..pairs.len()).map(|i| i as f32 / 100.0).collect())
    }
}

struct BrokenScorer;

impl SemanticScorer for BrokenScorer {
    fn batch_score(&self, _pairs: &[ScorePair]) -> Result<Vec<f32>> {
        Err(anyhow::anyhow!("CUDA out of memory"))
    }
}

const POLITIKA: &str = r#"[
  {
    "portal": "buka.ba",
    "kategorija": "Politika",
    "id": "politika_1",
    "tekst": "The cat sat on the mat. The cat was happy.",
    "ekstraktivna_sumarizacija": "The cat sat on the mat.",
    "apstraktivna_sumarizacija": "A happy cat sat on a mat.",
    "chatgpt_sumarizacija": "A cat was happy on the mat.",
    "gemini_sumarizacija": "",
    "claude_sumarizacija": null
  },
  {
    "kategorija": "Politika",
    "id": "politika_2",
    "tekst": "Parliament adopted the budget after a long debate.",
    "apstraktivna_sumarizacija": "The budget was adopted.",
    "gemini_sumarizacija": "Parliament adopted the budget."
  }
]"#;

const SPORT: &str = r#"[
  {
    "kategorija": "Sport",
    "id": 17,
    "tekst": "The home team won the final in extra time.",
    "apstraktivna_sumarizacija": "Home team wins the final.",
    "claude_sumarizacija": "The home team won the final."
  },
  "not a record"
]"#;

fn write_collections(dir: &Path) {
    // Written out of name order; runs must still be sorted.
    fs::write(dir.join("b_sport.json"), SPORT).unwrap();
    fs::write(dir.join("a_politika.json"), POLITIKA).unwrap();
    fs::write(dir.join("readme.txt"), "ignored").unwrap();
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_one_row_per_non_empty_summary_in_encounter_order() {
    let input = tempfile::tempdir().unwrap();
    write_collections(input.path());
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("scores.csv");

    let scorer = PositionScorer::new();
    let scorecard = run_evaluation(&EvalConfig::new(input.path(), &output), &scorer).unwrap();

    assert_eq!(scorer.calls.get(), 1);
    assert_eq!(scorecard.len(), 4);

    let lines = read_lines(&output);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], SCORECARD_HEADER.join(","));

    let keys: Vec<(String, String, String)> = lines[1..]
        .iter()
        .map(|line| {
            let cols: Vec<&str> = line.split(',').collect();
            assert_eq!(cols.len(), 10);
            (cols[0].into(), cols[1].into(), cols[2].into())
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("Politika".into(), "politika_1".into(), "Ekstraktivna_sumarizacija".into()),
            ("Politika".into(), "politika_1".into(), "ChatGPT".into()),
            ("Politika".into(), "politika_2".into(), "Gemini".into()),
            ("Sport".into(), "17".into(), "Claude".into()),
        ]
    );

    // Each row carries the score of its own queue position.
    let bertscores: Vec<&str> = lines[1..]
        .iter()
        .map(|line| line.rsplit(',').next().unwrap())
        .collect();
    assert_eq!(bertscores, vec!["0.00", "0.01", "0.02", "0.03"]);
}

#[test]
fn test_worked_example_values() {
    let input = tempfile::tempdir().unwrap();
    write_collections(input.path());
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("scores.csv");

    run_evaluation(&EvalConfig::new(input.path(), &output), &PositionScorer::new()).unwrap();

    let first = read_lines(&output)[1].clone();
    let cols: Vec<&str> = first.split(',').collect();
    assert_eq!(&cols[3..6], &["1.67", "0.71", "250.00"]);
}

#[test]
fn test_rerun_is_byte_identical() {
    let input = tempfile::tempdir().unwrap();
    write_collections(input.path());
    let out_dir = tempfile::tempdir().unwrap();
    let first = out_dir.path().join("first.csv");
    let second = out_dir.path().join("second.csv");

    run_evaluation(&EvalConfig::new(input.path(), &first), &PositionScorer::new()).unwrap();
    run_evaluation(&EvalConfig::new(input.path(), &second), &PositionScorer::new()).unwrap();

    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn test_scorer_failure_writes_nothing() {
    let input = tempfile::tempdir().unwrap();
    write_collections(input.path());
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("scores.csv");

    let err = run_evaluation(&EvalConfig::new(input.path(), &output), &BrokenScorer).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::BatchScoring(msg)) if msg.contains("out of memory")
    ));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_input_directory() {
    let out_dir = tempfile::tempdir().unwrap();
    let config = EvalConfig::new(out_dir.path().join("nope"), out_dir.path().join("scores.csv"));

    let err = run_evaluation(&config, &PositionScorer::new()).unwrap_err();
    assert!(matches!(err.downcast_ref::<EvalError>(), Some(EvalError::InputNotFound(_))));
}

#[test]
fn test_no_summaries_is_an_empty_batch() {
    let input = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("empty.json"),
        r#"[{"id": "x_1", "tekst": "Tekst.", "apstraktivna_sumarizacija": "Ref."}]"#,
    )
    .unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("scores.csv");

    let scorer = PositionScorer::new();
    let err = run_evaluation(&EvalConfig::new(input.path(), &output), &scorer).unwrap_err();

    assert!(matches!(err.downcast_ref::<EvalError>(), Some(EvalError::EmptyBatch)));
    assert_eq!(scorer.calls.get(), 0);
    assert!(!output.exists());
}
