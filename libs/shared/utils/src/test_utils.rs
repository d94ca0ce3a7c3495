use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::{BackendClient, BackendError, RecordQuery, UploadOptions};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_bucket: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            storage_bucket: "archivos".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            storage_bucket: self.storage_bucket.clone(),
            person_relation: false,
            backend_timeout: None,
            port: 3000,
        }
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn consultation_row(id: i64, name: &str, date: &str) -> Value {
        json!({
            "id": id,
            "nombre": name,
            "email": format!("{}@empresa.com", name.to_lowercase().replace(' ', ".")),
            "empresa": "Díaz Gill Laboratorios",
            "cargo": "Analista",
            "telefono": "+595 981 123456",
            "numero_documento": "4567890",
            "fecha_consulta": date,
            "motivo": "Chequeo preocupacional",
            "archivo_url": null,
            "creado_en": format!("{}T08:30:00+00:00", date)
        })
    }

    /// A row from a schema that keeps requester identity in `persona`, with
    /// the relation missing.
    pub fn orphan_relation_row(id: i64, date: &str) -> Value {
        json!({
            "id": id,
            "fecha_consulta": date,
            "motivo": null,
            "archivo_url": null,
            "creado_en": null,
            "persona": null
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Insert { table: String, fields: Value },
    Query(RecordQuery),
    Upload { bucket: String, path: String, size: usize, options: UploadOptions },
}

/// How a scripted backend operation fails.
#[derive(Debug, Clone)]
pub enum FakeFailure {
    Rejected(String),
    Unreachable,
}

impl FakeFailure {
    fn to_error(&self) -> BackendError {
        match self {
            FakeFailure::Rejected(message) => BackendError::Api {
                status: 500,
                message: message.clone(),
            },
            FakeFailure::Unreachable => BackendError::Network("connection refused".to_string()),
        }
    }
}

/// In-process stand-in for the managed backend. Records every call, serves
/// rows keyed by the first filter value, and can fail or delay on demand.
#[derive(Default)]
pub struct FakeBackend {
    base_url: String,
    calls: Mutex<Vec<BackendCall>>,
    rows: Mutex<HashMap<String, Vec<Value>>>,
    delays: Mutex<HashMap<String, Duration>>,
    upload_failure: Mutex<Option<FakeFailure>>,
    insert_failure: Mutex<Option<FakeFailure>>,
    query_failure: Mutex<Option<FakeFailure>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            base_url: "https://fake.supabase.co".to_string(),
            ..Self::default()
        }
    }

    pub fn with_rows(self, filter_value: &str, rows: Vec<Value>) -> Self {
        self.rows.lock().unwrap().insert(filter_value.to_string(), rows);
        self
    }

    pub fn with_delay(self, filter_value: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(filter_value.to_string(), delay);
        self
    }

    pub fn failing_upload(self, failure: FakeFailure) -> Self {
        *self.upload_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn failing_insert(self, failure: FakeFailure) -> Self {
        *self.insert_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn failing_query(self, failure: FakeFailure) -> Self {
        *self.query_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn set_query_failure(&self, failure: Option<FakeFailure>) {
        *self.query_failure.lock().unwrap() = failure;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inserts(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Insert { fields, .. } => Some(fields),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Upload { bucket, path, size, .. } => Some((bucket, path, size)),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<RecordQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Query(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BackendClient for FakeBackend {
    async fn insert_record(&self, table: &str, fields: Value) -> Result<(), BackendError> {
        self.record(BackendCall::Insert {
            table: table.to_string(),
            fields,
        });

        match self.insert_failure.lock().unwrap().as_ref() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<Value>, BackendError> {
        self.record(BackendCall::Query(query.clone()));

        let key = query
            .filters
            .first()
            .map(|(_, value)| value.clone())
            .unwrap_or_default();

        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.query_failure.lock().unwrap().clone();
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        let rows = self.rows.lock().unwrap().get(&key).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .map(|row| {
                query
                    .relations
                    .iter()
                    .fold(row, |row, relation| shared_database::normalize_relation(row, relation))
            })
            .collect())
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            size: bytes.len(),
            options: options.clone(),
        });

        match self.upload_failure.lock().unwrap().as_ref() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }
}
