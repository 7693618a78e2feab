//! In-memory gateway for engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::gateway::{Created, Lookup, RemoteEntityGateway};
use crate::models::{EntityDefinition, EntityKind};

#[derive(Default)]
struct State {
    records: HashMap<EntityKind, Vec<Value>>,
    lookup_failures: HashMap<String, AppError>,
    create_failures: HashMap<String, AppError>,
    panic_on: Option<String>,
    created: Vec<EntityDefinition>,
    lookup_calls: usize,
    create_calls: usize,
}

/// Remote state kept in a map. Created entities become visible to later lookups.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, kind: EntityKind, name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .records
            .entry(kind)
            .or_default()
            .push(json!({"name": name}));
    }

    pub fn fail_lookup(&self, name: &str, error: AppError) {
        let mut state = self.state.lock().unwrap();
        state.lookup_failures.insert(name.to_string(), error);
    }

    pub fn fail_create(&self, name: &str, error: AppError) {
        let mut state = self.state.lock().unwrap();
        state.create_failures.insert(name.to_string(), error);
    }

    pub fn panic_on(&self, name: &str) {
        self.state.lock().unwrap().panic_on = Some(name.to_string());
    }

    pub fn created(&self) -> Vec<EntityDefinition> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created().iter().map(|d| d.name().to_string()).collect()
    }

    pub fn lookup_calls(&self) -> usize {
        self.state.lock().unwrap().lookup_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }
}

/// Errors are not `Clone`; rebuild an equivalent one per call.
fn replay(error: &AppError) -> AppError {
    match error {
        AppError::RemoteStatus { status, body } => AppError::RemoteStatus {
            status: *status,
            body: body.clone(),
        },
        AppError::Timeout(secs) => AppError::Timeout(*secs),
        other => AppError::NetworkError(other.to_string()),
    }
}

#[async_trait]
impl RemoteEntityGateway for MemoryGateway {
    async fn exists(
        &self,
        kind: EntityKind,
        name: &str,
        uuid: Option<&str>,
    ) -> Result<Lookup, AppError> {
        let mut state = self.state.lock().unwrap();
        state.lookup_calls += 1;
        if state.panic_on.as_deref() == Some(name) {
            panic!("gateway exploded on {}", name);
        }
        if let Some(error) = state.lookup_failures.get(name) {
            return Err(replay(error));
        }

        let found = state.records.get(&kind).and_then(|records| {
            records.iter().find(|r| {
                r["name"].as_str() == Some(name)
                    || (uuid.is_some() && r["uuid"].as_str() == uuid)
            })
        });

        Ok(match found {
            Some(record) => Lookup::found(record.clone()),
            None => Lookup::not_found(),
        })
    }

    async fn create(&self, definition: &EntityDefinition) -> Result<Created, AppError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if let Some(error) = state.create_failures.get(definition.name()) {
            return Err(replay(error));
        }

        let record = json!({"name": definition.name(), "uuid": definition.uuid()});
        state
            .records
            .entry(definition.kind())
            .or_default()
            .push(record.clone());
        state.created.push(definition.clone());

        Ok(Created {
            status_code: 201,
            record,
        })
    }
}
