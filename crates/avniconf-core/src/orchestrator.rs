//! Runs a whole configuration document through reconciliation.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ReconcileConfig;
use crate::error::AppError;
use crate::gateway::RemoteEntityGateway;
use crate::hierarchy::resolve_hierarchy;
use crate::models::{ConfigDocument, EntityDefinition, EntityKind};
use crate::reconcile::EntityReconciler;
use crate::summary::{ConfigSummary, KindReport};

/// Organisation types that must never be configured automatically.
const BLOCKED_ORG_TYPES: [&str; 2] = ["Production", "UAT"];

/// Drives every entity kind through reconciliation in dependency order.
///
/// Kinds run in [`EntityKind::ORDER`], one entity at a time. Locations go
/// through [`resolve_hierarchy`] first so children carry their parent
/// reference. The returned [`ConfigSummary`] is always populated: per-entity
/// failures become outcomes, configuration errors and engine panics become a
/// terminal `error` summary with zeroed counts.
///
/// # Examples
///
/// ```no_run
/// use avniconf_core::{ConfigOrchestrator, RemoteEntityGateway};
/// use serde_json::json;
///
/// # async fn example(gateway: impl RemoteEntityGateway) {
/// let orchestrator = ConfigOrchestrator::new(gateway);
/// let summary = orchestrator
///     .run_value(&json!({
///         "addressLevelTypes": [{"name": "State", "level": 1}],
///         "locations": [
///             {"name": "Karnataka", "level": 1},
///             {"name": "Bengaluru", "level": 2}
///         ]
///     }))
///     .await;
/// println!("{}", summary.message);
/// # }
/// ```
pub struct ConfigOrchestrator<G> {
    gateway: G,
    config: ReconcileConfig,
    org_type: Option<String>,
    cancel: CancellationToken,
}

impl<G: RemoteEntityGateway> ConfigOrchestrator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            config: ReconcileConfig::default(),
            org_type: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    /// Declares the target organisation type. `Production` and `UAT` are refused.
    pub fn with_org_type(mut self, org_type: Option<String>) -> Self {
        self.org_type = org_type;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the run between entities when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validates untyped input, then runs it.
    ///
    /// Malformed input is reported as a blocking summary before any remote call.
    pub async fn run_value(&self, value: &Value) -> ConfigSummary {
        let started_at = Utc::now();
        match ConfigDocument::from_value(value) {
            Ok(document) => self.run(document).await,
            Err(e) if e.is_config_error() => {
                warn!("Configuration rejected: {}", e);
                ConfigSummary::blocked(&e, started_at)
            }
            Err(e) => {
                error!("Configuration could not be read: {}", e);
                ConfigSummary::exception(&e.to_string(), started_at)
            }
        }
    }

    /// Reconciles every kind present in `document`.
    pub async fn run(&self, document: ConfigDocument) -> ConfigSummary {
        let started_at = Utc::now();

        if let Err(e) = self.check_org_type() {
            warn!("Configuration rejected: {}", e);
            return ConfigSummary::blocked(&e, started_at);
        }

        match AssertUnwindSafe(self.process(document, started_at))
            .catch_unwind()
            .await
        {
            Ok(summary) => summary,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!("Reconciliation aborted: {}", detail);
                ConfigSummary::exception(&detail, started_at)
            }
        }
    }

    fn check_org_type(&self) -> Result<(), AppError> {
        match &self.org_type {
            Some(org_type) if BLOCKED_ORG_TYPES.contains(&org_type.trim()) => {
                Err(AppError::OrgTypeBlocked(org_type.trim().to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn process(&self, document: ConfigDocument, started_at: DateTime<Utc>) -> ConfigSummary {
        let reconciler = EntityReconciler::new(&self.gateway).with_cancellation(&self.cancel);

        let mut reports = Vec::new();
        let mut warnings = Vec::new();

        for kind in EntityKind::ORDER {
            if self.cancel.is_cancelled() {
                break;
            }
            if document.count(kind) == 0 {
                continue;
            }

            let mut definitions = if kind == EntityKind::Locations {
                let resolution = resolve_hierarchy(document.locations.clone());
                warnings.extend(resolution.warnings);
                resolution
                    .locations
                    .into_iter()
                    .map(EntityDefinition::Location)
                    .collect()
            } else {
                document.definitions(kind)
            };
            for definition in &mut definitions {
                definition.ensure_uuid();
            }

            info!("Processing {} ({} entities)...", kind, definitions.len());
            let outcomes = reconciler
                .reconcile(kind, &definitions, self.config.require_existence_check)
                .await;

            let report = KindReport::new(kind, outcomes);
            let counts = report.counts();
            info!(
                "{}: {} created, {} skipped, {} failed",
                kind, counts.successful, counts.skipped, counts.failed
            );
            reports.push(report);
        }

        let cancelled = self.cancel.is_cancelled();
        let summary = ConfigSummary::from_reports(reports, warnings, cancelled, started_at);
        info!("{}", summary.message);
        summary
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
