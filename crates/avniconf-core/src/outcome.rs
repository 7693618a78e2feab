//! Per-entity reconciliation outcomes.

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::EntityKind;

/// Coarse classification of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Skipped,
    Error,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeAction {
    /// Created on the server.
    Created,
    /// Found on the server; nothing was sent.
    AlreadyExists,
    /// The server refused the creation or the request failed.
    CreationFailed,
    /// The existence lookup failed, so creation was not attempted.
    VerificationFailed,
}

/// Result of reconciling a single entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationOutcome {
    pub name: String,
    pub status: OutcomeStatus,
    pub status_code: u16,
    pub message: String,
    pub action: OutcomeAction,
    /// Remote record: the created entity, or the existing match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
}

impl ReconciliationOutcome {
    pub fn created(name: impl Into<String>, status_code: u16, record: Value) -> Self {
        Self {
            name: name.into(),
            status: OutcomeStatus::Success,
            status_code,
            message: "Created successfully".to_string(),
            action: OutcomeAction::Created,
            record: (!record.is_null()).then_some(record),
        }
    }

    pub fn already_exists(kind: EntityKind, name: impl Into<String>, record: Option<Value>) -> Self {
        let name = name.into();
        Self {
            message: format!("{} '{}' already exists", kind.label(), name),
            name,
            status: OutcomeStatus::Skipped,
            status_code: 200,
            action: OutcomeAction::AlreadyExists,
            record,
        }
    }

    pub fn creation_failed(name: impl Into<String>, error: &AppError) -> Self {
        let message = match error {
            AppError::RemoteStatus { body, .. } => format!("Creation failed: {}", body),
            other => format!("Exception during creation: {}", other),
        };
        Self {
            name: name.into(),
            status: OutcomeStatus::Error,
            status_code: error.status_code(),
            message,
            action: OutcomeAction::CreationFailed,
            record: None,
        }
    }

    pub fn verification_failed(name: impl Into<String>, error: &AppError) -> Self {
        Self {
            name: name.into(),
            status: OutcomeStatus::Error,
            status_code: error.status_code(),
            message: format!("Verification failed: {}", error),
            action: OutcomeAction::VerificationFailed,
            record: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == OutcomeStatus::Error
    }
}
