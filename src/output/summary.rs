use crate::error::OutputError;
use crate::rubric::CRITERIA;
use crate::runner::{BatchOutcome, BatchStatus, RunReport};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub timestamp: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub provider: String,
    pub duration_sec: f64,
    pub total_records: usize,
    pub resumed_from: usize,
    pub processed: usize,
    pub batches: BatchTotals,
    pub criteria: Vec<CriterionSummary>,
    pub degraded: Vec<DegradedBatch>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BatchTotals {
    pub total: usize,
    pub completed: usize,
    pub repaired: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CriterionSummary {
    pub criterion: String,
    pub present: usize,
    /// Fraction of this run's records marked present
    pub rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DegradedBatch {
    pub index: usize,
    pub first_row: usize,
    pub rows: usize,
    pub fingerprint: String,
    pub status: String,
    pub duration_sec: f64,
}

/// `reports/out.csv` -> `reports/out.summary.json`
pub fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!("{}.summary.json", stem))
}

pub fn write_summary(
    path: &Path,
    run_report: &RunReport,
    input: &Path,
    output: &Path,
    provider: &str,
) -> Result<SummaryReport, OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
    }

    let summary = build_summary(run_report, input, output, provider);
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(path, json).map_err(OutputError::WriteSummary)?;

    Ok(summary)
}

fn build_summary(
    run_report: &RunReport,
    input: &Path,
    output: &Path,
    provider: &str,
) -> SummaryReport {
    let processed = run_report.processed();

    let criteria = CRITERIA
        .iter()
        .zip(run_report.criterion_counts)
        .map(|(criterion, present)| CriterionSummary {
            criterion: criterion.to_string(),
            present,
            rate: if processed == 0 {
                0.0
            } else {
                present as f64 / processed as f64
            },
        })
        .collect();

    let degraded = run_report
        .batches
        .iter()
        .filter(|b| b.status != BatchStatus::Completed)
        .map(degraded_batch)
        .collect();

    SummaryReport {
        timestamp: Utc::now().to_rfc3339(),
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        provider: provider.to_string(),
        duration_sec: run_report.total_duration.as_secs_f64(),
        total_records: run_report.total_records,
        resumed_from: run_report.resumed_from,
        processed,
        batches: BatchTotals {
            total: run_report.batches.len(),
            completed: run_report.completed(),
            repaired: run_report.repaired(),
            failed: run_report.failed(),
        },
        criteria,
        degraded,
    }
}

fn degraded_batch(batch: &BatchOutcome) -> DegradedBatch {
    DegradedBatch {
        index: batch.index,
        first_row: batch.rows.start,
        rows: batch.rows.len(),
        fingerprint: batch.fingerprint.clone(),
        status: batch.status.to_string(),
        duration_sec: batch.duration.as_secs_f64(),
    }
}
