//! Bulk prediction job
//!
//! Reads one query per line and writes one `{query, assessment_url}` JSON
//! line per recommendation.

use assessment_core::{BatchEntry, BatchOutcome, ServingContext};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::ServerResult;

#[derive(Serialize)]
struct PredictionRow<'a> {
    query: &'a str,
    assessment_url: &'a str,
}

/// Counts from one prediction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredictionSummary {
    pub queries: usize,
    pub predictions: usize,
    pub failed: usize,
}

/// Run every query in `input` and write predictions to `output`.
///
/// Blank lines are skipped. A failing query is logged and counted; the run
/// continues with the next one.
pub fn run_predictions(
    ctx: &ServingContext,
    input: &Path,
    output: &Path,
    top_k: usize,
) -> ServerResult<PredictionSummary> {
    let reader = BufReader::new(File::open(input)?);
    let mut queries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            queries.push(trimmed.to_string());
        }
    }

    tracing::info!("Generating predictions for {} queries", queries.len());

    let mut writer = BufWriter::new(File::create(output)?);
    let mut summary = PredictionSummary {
        queries: queries.len(),
        ..Default::default()
    };
    let progress_every = (queries.len() / 5).max(1);

    for (i, query) in queries.iter().enumerate() {
        let entry = BatchEntry::run(ctx, query, top_k);
        match &entry.outcome {
            BatchOutcome::Recommendations(recs) => {
                for rec in recs {
                    serde_json::to_writer(
                        &mut writer,
                        &PredictionRow {
                            query,
                            assessment_url: &rec.url,
                        },
                    )?;
                    writer.write_all(b"\n")?;
                    summary.predictions += 1;
                }
            }
            BatchOutcome::Error(e) => {
                tracing::warn!("Skipping query {}: {}", i + 1, e);
                summary.failed += 1;
            }
        }

        if (i + 1) % progress_every == 0 {
            tracing::info!("Processed {}/{} queries", i + 1, queries.len());
        }
    }

    writer.flush()?;
    tracing::info!(
        "Wrote {} predictions to {} ({} queries failed)",
        summary.predictions,
        output.display(),
        summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::Value;

    #[test]
    fn test_predictions_written_per_recommendation() {
        let ctx = fixtures::context();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("queries.txt");
        let output = dir.path().join("predictions.jsonl");
        std::fs::write(&input, "Java developer\n\nab\nSQL analyst with leadership\n").unwrap();

        let summary = run_predictions(&ctx, &input, &output, 5).unwrap();
        assert_eq!(
            summary,
            PredictionSummary {
                queries: 3,
                predictions: 10,
                failed: 1,
            }
        );

        let written = std::fs::read_to_string(&output).unwrap();
        let rows: Vec<Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0]["query"], "Java developer");
        assert_eq!(rows[0]["assessment_url"], "/java");
        assert_eq!(rows[9]["query"], "SQL analyst with leadership");
    }

    #[test]
    fn test_missing_input_is_error() {
        let ctx = fixtures::context();
        let dir = tempfile::tempdir().unwrap();
        let result = run_predictions(
            &ctx,
            &dir.path().join("absent.txt"),
            &dir.path().join("out.jsonl"),
            10,
        );
        assert!(result.is_err());
    }
}
