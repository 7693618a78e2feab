//! Aggregation and classification of a reconciliation run.
//!
//! Classification is a pure function of the aggregate counts. It is computed
//! once, after every kind has been processed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::hierarchy::ResolutionWarning;
use crate::models::EntityKind;
use crate::outcome::{OutcomeStatus, ReconciliationOutcome};

/// Aggregate counts for a run.
///
/// `total == successful + failed + skipped` always holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SummaryCounts {
    /// Creates a new empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome, incrementing the appropriate counter.
    pub fn record(&mut self, outcome: &ReconciliationOutcome) {
        self.total += 1;
        match outcome.status {
            OutcomeStatus::Success => self.successful += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Error => self.failed += 1,
        }
    }
}

/// Top-level result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Success,
    PartialSuccess,
    Failure,
    /// The run did not process entities: blocking configuration error or crash.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NoEntitiesToProcess,
    AllEntitiesCreated,
    AllEntitiesAlreadyExist,
    AllEntitiesFailed,
    PartialEntitiesCreated,
    MixedResults,
    NoConfig,
    ValidationFailed,
    ProductionUatBlocked,
    ExceptionOccurred,
}

/// Suggested next step for whoever consumes the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    CompleteSuccess,
    AnalyzeFailures,
    RequestConfig,
    FixValidationErrors,
    BlockCreation,
    HandleException,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub result: RunResult,
    pub status: RunStatus,
    pub flow_action: FlowAction,
}

/// Classifies a run from its counts.
///
/// | Condition                       | result          | status                     |
/// |---------------------------------|-----------------|----------------------------|
/// | total == 0                      | success         | no_entities_to_process     |
/// | successful == total             | success         | all_entities_created       |
/// | skipped == total                | success         | all_entities_already_exist |
/// | failed == total                 | failure         | all_entities_failed        |
/// | successful > 0 and failed > 0   | partial_success | partial_entities_created   |
/// | otherwise                       | partial_success | mixed_results              |
///
/// # Examples
///
/// ```
/// use avniconf_core::summary::{classify, RunResult, RunStatus, SummaryCounts};
///
/// let counts = SummaryCounts { total: 5, successful: 2, failed: 3, skipped: 0 };
/// let c = classify(&counts);
/// assert_eq!(c.result, RunResult::PartialSuccess);
/// assert_eq!(c.status, RunStatus::PartialEntitiesCreated);
/// ```
pub fn classify(counts: &SummaryCounts) -> Classification {
    let (result, status) = if counts.total == 0 {
        (RunResult::Success, RunStatus::NoEntitiesToProcess)
    } else if counts.successful == counts.total {
        (RunResult::Success, RunStatus::AllEntitiesCreated)
    } else if counts.skipped == counts.total {
        (RunResult::Success, RunStatus::AllEntitiesAlreadyExist)
    } else if counts.failed == counts.total {
        (RunResult::Failure, RunStatus::AllEntitiesFailed)
    } else if counts.successful > 0 && counts.failed > 0 {
        (RunResult::PartialSuccess, RunStatus::PartialEntitiesCreated)
    } else {
        (RunResult::PartialSuccess, RunStatus::MixedResults)
    };

    let flow_action = match result {
        RunResult::Success => FlowAction::CompleteSuccess,
        _ => FlowAction::AnalyzeFailures,
    };

    Classification {
        result,
        status,
        flow_action,
    }
}

/// Outcomes for one entity kind, in processing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindReport {
    pub kind: EntityKind,
    pub outcomes: Vec<ReconciliationOutcome>,
}

impl KindReport {
    pub fn new(kind: EntityKind, outcomes: Vec<ReconciliationOutcome>) -> Self {
        Self { kind, outcomes }
    }

    pub fn counts(&self) -> SummaryCounts {
        let mut counts = SummaryCounts::new();
        for outcome in &self.outcomes {
            counts.record(outcome);
        }
        counts
    }
}

/// Final report of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub result: RunResult,
    pub status: RunStatus,
    pub flow_action: FlowAction,
    pub message: String,
    pub summary: SummaryCounts,
    pub results: Vec<KindReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ResolutionWarning>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ConfigSummary {
    /// Builds the summary of a run that processed entities.
    pub fn from_reports(
        results: Vec<KindReport>,
        warnings: Vec<ResolutionWarning>,
        cancelled: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut counts = SummaryCounts::new();
        for outcome in results.iter().flat_map(|r| &r.outcomes) {
            counts.record(outcome);
        }
        let classification = classify(&counts);

        let mut message = format!(
            "Processed {} entities: {} created, {} skipped, {} failed",
            counts.total, counts.successful, counts.skipped, counts.failed
        );
        if cancelled {
            message.push_str(" (cancelled before completion)");
        }

        Self {
            result: classification.result,
            status: classification.status,
            flow_action: classification.flow_action,
            message,
            summary: counts,
            results,
            warnings,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Summary for a configuration error caught before any remote call.
    pub fn blocked(error: &AppError, started_at: DateTime<Utc>) -> Self {
        let (status, flow_action) = match error {
            AppError::NoEntityKinds => (RunStatus::NoConfig, FlowAction::RequestConfig),
            AppError::OrgTypeBlocked(_) => {
                (RunStatus::ProductionUatBlocked, FlowAction::BlockCreation)
            }
            _ => (RunStatus::ValidationFailed, FlowAction::FixValidationErrors),
        };
        Self::terminal(status, flow_action, error.user_message(), started_at)
    }

    /// Summary for an unexpected failure inside the engine itself.
    pub fn exception(detail: &str, started_at: DateTime<Utc>) -> Self {
        Self::terminal(
            RunStatus::ExceptionOccurred,
            FlowAction::HandleException,
            format!("Unexpected error: {}", detail),
            started_at,
        )
    }

    fn terminal(
        status: RunStatus,
        flow_action: FlowAction,
        message: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            result: RunResult::Error,
            status,
            flow_action,
            message,
            summary: SummaryCounts::default(),
            results: Vec::new(),
            warnings: Vec::new(),
            cancelled: false,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Outcomes for `kind`, empty if the kind was not processed.
    pub fn outcomes(&self, kind: EntityKind) -> &[ReconciliationOutcome] {
        self.results
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.outcomes.as_slice())
            .unwrap_or(&[])
    }

    /// True for `success` and `partial_success`.
    pub fn is_ok(&self) -> bool {
        matches!(self.result, RunResult::Success | RunResult::PartialSuccess)
    }
}
