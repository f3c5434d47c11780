use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

mod errors;
#[cfg(test)]
pub mod memory;
mod rest;

pub use errors::DatabaseError;
pub use rest::PostgrestRepository;

/// Column equality conditions, all of which must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.conditions.push((column.to_string(), value.to_string()));
        self
    }

    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    /// Whether a JSON record satisfies every condition. Scalars are compared
    /// by their textual form, the way they travel in a REST query string.
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            match record.get(column) {
                Some(Value::String(actual)) => actual == expected,
                Some(Value::Null) | None => false,
                Some(actual) => actual.to_string() == *expected,
            }
        })
    }
}

/// Table level access to the hosted database. Handlers only see this trait.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, DatabaseError>;

    /// Applies `patch` to every matching record and returns the updated records
    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, DatabaseError>;

    /// Inserts one record and returns it as stored
    async fn insert(&self, table: &str, record: Value) -> Result<Vec<Value>, DatabaseError>;
}

/// Deserializes raw records into a typed row
pub fn decode_records<T: DeserializeOwned>(
    table: &str,
    records: Vec<Value>,
) -> Result<Vec<T>, DatabaseError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|e| DatabaseError::DecodeError {
                table: table.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
