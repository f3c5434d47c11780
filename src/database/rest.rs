use super::{DatabaseError, Filter, Repository};
use async_trait::async_trait;
use postgrest::{Builder, Postgrest};
use serde_json::Value;
use tracing::{debug, error};

/// Repository backed by the Supabase PostgREST endpoint
pub struct PostgrestRepository {
    client: Postgrest,
}

impl PostgrestRepository {
    pub fn new(url: &str, service_key: &str) -> Self {
        let rest_url = format!("{}/rest/v1", url.trim_end_matches('/'));
        let client = Postgrest::new(&rest_url)
            .insert_header("apikey", service_key)
            .insert_header("Authorization", &format!("Bearer {}", service_key));

        Self { client }
    }

    fn filtered(builder: Builder, filter: &Filter) -> Builder {
        filter
            .conditions()
            .iter()
            .fold(builder, |builder, (column, value)| builder.eq(column, value))
    }

    async fn execute(table: &str, builder: Builder) -> Result<Vec<Value>, DatabaseError> {
        let response = builder
            .execute()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        if !status.is_success() {
            error!(table, status = %status, body = %body, "PostgREST request failed");
            return Err(DatabaseError::QueryError(format!(
                "{} responded with {}: {}",
                table, status, body
            )));
        }

        debug!(table, status = %status, "PostgREST request succeeded");
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&body).map_err(|e| DatabaseError::DecodeError {
            table: table.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Repository for PostgrestRepository {
    async fn get(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        let builder = Self::filtered(self.client.from(table).select("*"), filter);
        Self::execute(table, builder).await
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, DatabaseError> {
        let builder = Self::filtered(self.client.from(table).update(patch.to_string()), filter);
        Self::execute(table, builder).await
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Vec<Value>, DatabaseError> {
        let builder = self.client.from(table).insert(record.to_string());
        Self::execute(table, builder).await
    }
}
