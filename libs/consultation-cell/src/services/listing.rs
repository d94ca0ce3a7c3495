use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, warn};

use shared_database::{BackendClient, RecordQuery};
use shared_models::{ConsultationRecord, CONSULTATION_TABLE, PERSON_RELATION};

use crate::models::ConsultationError;

pub struct ConsultationQueryService {
    backend: Arc<dyn BackendClient>,
    person_relation: bool,
}

impl ConsultationQueryService {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self {
            backend,
            person_relation: false,
        }
    }

    /// Resolve requester identity through the `persona` relation.
    pub fn with_person_relation(mut self, enabled: bool) -> Self {
        self.person_relation = enabled;
        self
    }

    pub fn query_for(&self, date: NaiveDate) -> RecordQuery {
        // The ordering is a no-op while the filter pins one date
        let query = RecordQuery::new(CONSULTATION_TABLE)
            .eq("fecha_consulta", date.format("%Y-%m-%d").to_string())
            .order("fecha_consulta", true);

        if self.person_relation {
            query.with_relation(PERSON_RELATION)
        } else {
            query
        }
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<ConsultationRecord>, ConsultationError> {
        debug!("Fetching consultations for {}", date);

        let rows = self
            .backend
            .query_records(&self.query_for(date))
            .await
            .map_err(|e| {
                error!("Consultation query failed: {}", e);
                ConsultationError::Fetch(e)
            })?;

        // One malformed row must not hide the rest of the day
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<ConsultationRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable consultation row: {}", e);
                    None
                }
            })
            .collect())
    }
}
