//! In-process repository used by handler tests.

use super::{DatabaseError, Filter, Repository};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, table: &str, records: Vec<Value>) -> Self {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(records);
        self
    }

    pub fn records(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        Ok(self
            .records(table)
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();

        for record in tables.entry(table.to_string()).or_default().iter_mut() {
            if !filter.matches(record) {
                continue;
            }
            if let (Some(fields), Some(changes)) = (record.as_object_mut(), patch.as_object()) {
                for (key, value) in changes {
                    fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(record.clone());
        }

        Ok(updated)
    }

    async fn insert(&self, table: &str, mut record: Value) -> Result<Vec<Value>, DatabaseError> {
        if let Some(fields) = record.as_object_mut() {
            fields
                .entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        }

        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record.clone());

        Ok(vec![record])
    }
}

/// Repository whose every call fails, for exercising error paths
pub struct UnavailableRepository;

#[async_trait]
impl Repository for UnavailableRepository {
    async fn get(&self, _table: &str, _filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        Err(DatabaseError::ConnectionError("connection refused".to_string()))
    }

    async fn update(
        &self,
        _table: &str,
        _filter: &Filter,
        _patch: Value,
    ) -> Result<Vec<Value>, DatabaseError> {
        Err(DatabaseError::ConnectionError("connection refused".to_string()))
    }

    async fn insert(&self, _table: &str, _record: Value) -> Result<Vec<Value>, DatabaseError> {
        Err(DatabaseError::ConnectionError("connection refused".to_string()))
    }
}
