//! Capabilities the scheduling screens consume from the managed backend.
//!
//! The backend owns persistence and consistency. Callers treat an
//! implementation as a pre-configured capability and never learn how it was
//! configured.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Equality-filtered read of one table, optionally projecting related rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub table: String,
    pub filters: Vec<(String, String)>,
    pub order_by: Option<OrderBy>,
    /// Related tables joined by foreign key, each returned as zero-or-one object.
    pub relations: Vec<String>,
}

impl RecordQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order_by: None,
            relations: Vec::new(),
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order_by = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relations.push(relation.into());
        self
    }

    /// Column projection in PostgREST syntax, e.g. `*,persona(*)`.
    pub fn select_clause(&self) -> String {
        let mut select = String::from("*");
        for relation in &self.relations {
            select.push_str(&format!(",{}(*)", relation));
        }
        select
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// Max-age in seconds handed to the storage CDN.
    pub cache_control: String,
    pub overwrite: bool,
}

impl UploadOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: "3600".to_string(),
            overwrite: false,
        }
    }
}

#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn insert_record(&self, table: &str, fields: Value) -> Result<(), BackendError>;

    /// Rows come back with every requested relation already collapsed to an
    /// object or `null`.
    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<Value>, BackendError>;

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), BackendError>;

    /// Public URL of a stored blob. Never fails; the URL is derived locally.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
