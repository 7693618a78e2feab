//! Avniconf Core - Domain types, hierarchy resolution, and the reconciliation engine.

pub mod config;
pub mod error;
pub mod gateway;
pub mod hierarchy;
pub mod models;
pub mod orchestrator;
pub mod outcome;
pub mod reconcile;
pub mod summary;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    default_config_path, load_settings, HttpConfig, NameMatch, ReconcileConfig, Settings,
};
pub use error::AppError;
pub use gateway::{Created, Lookup, RemoteEntityGateway};
pub use hierarchy::{resolve_hierarchy, HierarchyResolution, ResolutionWarning};
pub use models::{
    AddressLevelType, Catchment, ConfigDocument, EncounterType, EntityDefinition, EntityKind,
    Location, Program, SubjectType,
};
pub use orchestrator::ConfigOrchestrator;
pub use outcome::{OutcomeAction, OutcomeStatus, ReconciliationOutcome};
pub use reconcile::EntityReconciler;
pub use summary::{
    classify, Classification, ConfigSummary, FlowAction, KindReport, RunResult, RunStatus,
    SummaryCounts,
};
