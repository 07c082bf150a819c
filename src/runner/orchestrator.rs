use crate::error::RunnerError;
use crate::parser::{default_judgments, split_and_repair, Judgment, Mark};
use crate::prompt::{build_batch_prompt, fingerprint};
use crate::provider::CompletionClient;
use crate::rubric::CRITERIA;
use crate::table::{output_header, InputTable, OutputTable};
use std::num::NonZeroUsize;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::batch::partition;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: NonZeroUsize,
    pub delimiter: String,
    /// Applied after each appended batch except the last
    pub batch_delay: Duration,
}

/// Where results go
#[derive(Debug, Clone, Copy)]
pub struct OutputSpec<'a> {
    pub path: &'a Path,
    pub write_bom: bool,
    /// Continue an existing output instead of truncating it
    pub resume: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Emitting(usize),
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchStatus {
    Completed,
    /// Reply had the wrong number of fragments or unparseable ones
    Repaired {
        fragments: usize,
        malformed: usize,
    },
    /// The request failed; every record got an empty judgment
    TransportFailed {
        error: String,
    },
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Repaired {
                fragments,
                malformed,
            } => write!(
                f,
                "repaired ({} fragments, {} malformed)",
                fragments, malformed
            ),
            BatchStatus::TransportFailed { error } => write!(f, "failed: {}", error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub index: usize,
    pub rows: Range<usize>,
    pub status: BatchStatus,
    pub fingerprint: String,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct RunReport {
    pub total_records: usize,
    /// Rows already present in a resumed output
    pub resumed_from: usize,
    pub batches: Vec<BatchOutcome>,
    /// Records marked present, per criterion in column order
    pub criterion_counts: [usize; CRITERIA.len()],
    pub total_duration: Duration,
}

impl RunReport {
    fn new(total_records: usize, resumed_from: usize) -> Self {
        Self {
            total_records,
            resumed_from,
            batches: Vec::new(),
            criterion_counts: [0; CRITERIA.len()],
            total_duration: Duration::ZERO,
        }
    }

    fn record(&mut self, outcome: BatchOutcome, judgments: &[Judgment]) {
        for judgment in judgments {
            for (idx, (_, mark)) in judgment.marks().enumerate() {
                if mark == Mark::Present {
                    self.criterion_counts[idx] += 1;
                }
            }
        }
        self.batches.push(outcome);
    }

    /// Records appended by this run
    pub fn processed(&self) -> usize {
        self.batches.iter().map(|b| b.rows.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::TransportFailed { .. }))
    }

    pub fn repaired(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Repaired { .. }))
    }

    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Completed))
    }

    fn count(&self, pred: impl Fn(&BatchStatus) -> bool) -> usize {
        self.batches.iter().filter(|b| pred(&b.status)).count()
    }
}

/// Drives the input table through the completion client one batch at a time.
/// Strictly sequential: a batch is appended and synced before the next is sent.
pub struct Orchestrator {
    client: Arc<dyn CompletionClient>,
    options: BatchOptions,
    state: RunState,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn CompletionClient>, options: BatchOptions) -> Self {
        Self {
            client,
            options,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub async fn run(
        &mut self,
        input: &InputTable,
        text_column: usize,
        output: OutputSpec<'_>,
    ) -> Result<RunReport, RunnerError> {
        let start = Instant::now();
        let total = input.len();

        let mut table = self.open_output(input, output)?;
        let resumed_from = table.rows_written();
        if resumed_from > total {
            warn!(
                "Output already has {} rows but input has only {}; nothing to do",
                resumed_from, total
            );
        } else if resumed_from > 0 {
            info!("Resuming after {} already written records", resumed_from);
        }

        let plan = partition(resumed_from, total, self.options.batch_size);
        let mut report = RunReport::new(total, resumed_from.min(total));

        info!(
            "Grading {} records in {} batches of up to {} with {}",
            total - report.resumed_from,
            plan.len(),
            self.options.batch_size,
            self.client.name()
        );

        self.state = if plan.is_empty() {
            RunState::Done
        } else {
            RunState::Emitting(0)
        };

        while let RunState::Emitting(index) = self.state {
            let rows = plan[index].clone();
            let batch_start = Instant::now();

            let texts = input.texts(rows.clone(), text_column);
            let (status, judgments, print) = self.grade_batch(index, &texts).await;

            table.append_batch(&input.rows()[rows.clone()], &judgments)?;
            info!("Processed {}/{} records", rows.end, total);

            report.record(
                BatchOutcome {
                    index,
                    rows,
                    status,
                    fingerprint: print,
                    duration: batch_start.elapsed(),
                },
                &judgments,
            );

            self.state = if index + 1 < plan.len() {
                if !self.options.batch_delay.is_zero() {
                    sleep(self.options.batch_delay).await;
                }
                RunState::Emitting(index + 1)
            } else {
                RunState::Done
            };
        }

        report.total_duration = start.elapsed();
        Ok(report)
    }

    fn open_output(
        &self,
        input: &InputTable,
        output: OutputSpec<'_>,
    ) -> Result<OutputTable, RunnerError> {
        let header = output_header(input.headers());
        if output.resume {
            if let Some(table) = OutputTable::resume(output.path, &header)? {
                return Ok(table);
            }
            info!(
                "Nothing to resume at {}; starting fresh",
                output.path.display()
            );
        }
        Ok(OutputTable::create(output.path, &header, output.write_bom)?)
    }

    /// Prompt, call and split one batch. Never fails: problems degrade to empty judgments.
    async fn grade_batch(
        &self,
        index: usize,
        texts: &[String],
    ) -> (BatchStatus, Vec<Judgment>, String) {
        let payload = build_batch_prompt(texts, &self.options.delimiter);
        let print = fingerprint(&payload);
        debug!(
            "Batch {} ({} records) payload {} ({} bytes)",
            index,
            texts.len(),
            print,
            payload.len()
        );

        let completion = match self.client.complete(&payload).await {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Batch {} ({}) failed: {}; recording empty judgments",
                    index, print, e
                );
                return (
                    BatchStatus::TransportFailed {
                        error: e.to_string(),
                    },
                    default_judgments(texts.len()),
                    print,
                );
            }
        };

        debug!(
            "Batch {} reply in {:?}:\n{}",
            index, completion.duration, completion.text
        );

        let outcome = split_and_repair(&completion.text, &self.options.delimiter, texts.len());
        for (offset, judgment) in outcome.judgments.iter().enumerate() {
            if !judgment.extra().is_empty() {
                debug!(
                    "Batch {} record {}: ignoring keys outside the rubric: {:?}",
                    index,
                    offset,
                    judgment.extra().keys().collect::<Vec<_>>()
                );
            }
        }
        debug!(
            "Batch {}: {} of {} records with no criterion marked",
            index,
            outcome.judgments.iter().filter(|j| j.is_empty()).count(),
            texts.len()
        );
        let status = if outcome.is_clean() {
            BatchStatus::Completed
        } else {
            if outcome.malformed > 0 {
                warn!(
                    "Batch {}: {} of {} fragments unparseable",
                    index, outcome.malformed, outcome.fragments
                );
            } else {
                debug!(
                    "Batch {}: {} fragments for {} records",
                    index,
                    outcome.fragments,
                    texts.len()
                );
            }
            BatchStatus::Repaired {
                fragments: outcome.fragments,
                malformed: outcome.malformed,
            }
        };

        (status, outcome.judgments, print)
    }
}
