use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::backend::{BackendClient, RecordQuery, UploadOptions};
use crate::error::BackendError;
use crate::relation::normalize_relation;

/// REST client for a Supabase project (PostgREST records + Storage blobs),
/// authenticated with the project's public anon key.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.backend_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        })
    }

    fn get_headers(&self) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| BackendError::Configuration("anon key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|_| BackendError::Configuration("anon key is not a valid header value".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }

    fn builder(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {} {}", method, url);

        Ok(self.client.request(method, &url).headers(self.get_headers()?))
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response, BackendError> {
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&error_text),
            });
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let mut req = self.builder(method, path)?;
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = self.execute(req).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }
}

#[async_trait]
impl BackendClient for SupabaseClient {
    async fn insert_record(&self, table: &str, fields: Value) -> Result<(), BackendError> {
        let path = format!("/rest/v1/{}", table);

        let req = self
            .builder(Method::POST, &path)?
            .header("Prefer", "return=minimal")
            .json(&fields);

        self.execute(req).await?;
        debug!("Inserted row into {}", table);
        Ok(())
    }

    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<Value>, BackendError> {
        let mut path = format!(
            "/rest/v1/{}?select={}",
            query.table,
            urlencoding::encode(&query.select_clause())
        );
        for (column, value) in &query.filters {
            path.push_str(&format!("&{}=eq.{}", column, urlencoding::encode(value)));
        }
        if let Some(order) = &query.order_by {
            let direction = if order.ascending { "asc" } else { "desc" };
            path.push_str(&format!("&order={}.{}", order.column, direction));
        }

        let rows: Vec<Value> = self.request(Method::GET, &path, None).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                query
                    .relations
                    .iter()
                    .fold(row, |row, relation| normalize_relation(row, relation))
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
        let storage_path = format!("/storage/v1/object/{}/{}", bucket, path);
        debug!("Uploading {} bytes to storage path: {}", bytes.len(), storage_path);

        let content_type = HeaderValue::from_str(&options.content_type)
            .map_err(|_| BackendError::Configuration(format!("invalid content type: {}", options.content_type)))?;
        let cache_control = HeaderValue::from_str(&format!("max-age={}", options.cache_control))
            .map_err(|_| BackendError::Configuration(format!("invalid cache control: {}", options.cache_control)))?;
        let upsert = HeaderValue::from_static(if options.overwrite { "true" } else { "false" });

        let req = self
            .builder(Method::POST, &storage_path)?
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, cache_control)
            .header(HeaderName::from_static("x-upsert"), upsert)
            .body(bytes);

        self.execute(req).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }
}

// PostgREST and Storage both answer errors with a JSON body carrying `message`
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
