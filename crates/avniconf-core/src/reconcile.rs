//! Verify-then-create-or-skip for one entity kind.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::gateway::RemoteEntityGateway;
use crate::models::{EntityDefinition, EntityKind};
use crate::outcome::ReconciliationOutcome;

/// Reconciles definitions one at a time against a [`RemoteEntityGateway`].
///
/// Entities are processed strictly in the order given. A failure never stops
/// the remaining entities; it becomes that entity's outcome. If a cancellation
/// token is attached, it is checked before each entity, and entities not yet
/// started are left out of the result.
pub struct EntityReconciler<'a, G: ?Sized> {
    gateway: &'a G,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, G: RemoteEntityGateway + ?Sized> EntityReconciler<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Produces one outcome per processed definition, in input order.
    pub async fn reconcile(
        &self,
        kind: EntityKind,
        definitions: &[EntityDefinition],
        require_existence_check: bool,
    ) -> Vec<ReconciliationOutcome> {
        let total = definitions.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, definition) in definitions.iter().enumerate() {
            if self.cancel.is_some_and(|t| t.is_cancelled()) {
                warn!(
                    "Cancelled while processing {}: {} of {} not started",
                    kind,
                    total - i,
                    total
                );
                break;
            }

            let outcome = self.reconcile_one(definition, require_existence_check).await;
            if outcome.is_error() {
                warn!("[{}/{}] {} '{}': {}", i + 1, total, kind, outcome.name, outcome.message);
            } else {
                info!("[{}/{}] {} '{}': {}", i + 1, total, kind, outcome.name, outcome.message);
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Reconciles a single definition.
    ///
    /// Creation is attempted only after a lookup confirmed the entity is
    /// missing, or when `require_existence_check` is false.
    pub async fn reconcile_one(
        &self,
        definition: &EntityDefinition,
        require_existence_check: bool,
    ) -> ReconciliationOutcome {
        let kind = definition.kind();
        let name = definition.name();

        if require_existence_check {
            match self.gateway.exists(kind, name, definition.uuid()).await {
                Ok(lookup) if lookup.found => {
                    return ReconciliationOutcome::already_exists(kind, name, lookup.record);
                }
                Ok(_) => debug!("{} '{}' not found, creating", kind, name),
                Err(e) => return ReconciliationOutcome::verification_failed(name, &e),
            }
        }

        match self.gateway.create(definition).await {
            Ok(created) => ReconciliationOutcome::created(name, created.status_code, created.record),
            Err(e) => ReconciliationOutcome::creation_failed(name, &e),
        }
    }
}
