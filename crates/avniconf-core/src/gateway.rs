//! The contract between the reconciliation engine and the remote server.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{EntityDefinition, EntityKind};

/// Result of an existence lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub found: bool,
    /// The matching remote record, when found.
    pub record: Option<Value>,
}

impl Lookup {
    pub fn found(record: Value) -> Self {
        Self {
            found: true,
            record: Some(record),
        }
    }

    pub fn not_found() -> Self {
        Self {
            found: false,
            record: None,
        }
    }
}

/// Result of a successful creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub status_code: u16,
    /// Response body, or `Value::Null` if the server sent none.
    pub record: Value,
}

/// Existence lookup and creation for one entity at a time.
///
/// Implementations must report every failure as an `Err`: a failed lookup is
/// never "not found", and a non-2xx creation is `AppError::RemoteStatus`.
#[async_trait]
pub trait RemoteEntityGateway: Send + Sync {
    /// Looks for a remote entity of `kind` matching `name` or `uuid`.
    async fn exists(
        &self,
        kind: EntityKind,
        name: &str,
        uuid: Option<&str>,
    ) -> Result<Lookup, AppError>;

    /// Submits a creation request for `definition`.
    async fn create(&self, definition: &EntityDefinition) -> Result<Created, AppError>;
}

#[async_trait]
impl<T: RemoteEntityGateway + ?Sized> RemoteEntityGateway for Arc<T> {
    async fn exists(
        &self,
        kind: EntityKind,
        name: &str,
        uuid: Option<&str>,
    ) -> Result<Lookup, AppError> {
        (**self).exists(kind, name, uuid).await
    }

    async fn create(&self, definition: &EntityDefinition) -> Result<Created, AppError> {
        (**self).create(definition).await
    }
}
