use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use shared_models::ConsultationRecord;
use shared_utils::Clock;

use crate::models::{ConsultationError, ListSnapshot, ListStatus};
use crate::services::access::{AccessGate, SessionStorage};
use crate::services::detail::{render_detail, summarize};
use crate::services::listing::ConsultationQueryService;

/// Issued for every list query. Only the ticket with the latest sequence
/// number may update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    pub seq: u64,
    pub date: NaiveDate,
}

#[derive(Debug)]
pub struct ListView {
    date: Option<NaiveDate>,
    latest_seq: u64,
    status: ListStatus,
    records: Vec<ConsultationRecord>,
    error: Option<String>,
    expanded: Option<i64>,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            date: None,
            latest_seq: 0,
            status: ListStatus::Idle,
            records: Vec::new(),
            error: None,
            expanded: None,
        }
    }
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query for `date`. Any ticket issued earlier becomes stale.
    pub fn begin(&mut self, date: NaiveDate) -> QueryTicket {
        self.latest_seq += 1;
        self.date = Some(date);
        self.status = ListStatus::Loading;
        self.records.clear();
        self.error = None;

        QueryTicket {
            seq: self.latest_seq,
            date,
        }
    }

    /// Apply a query outcome. Returns false when the ticket was superseded
    /// and the outcome discarded.
    pub fn complete(
        &mut self,
        ticket: QueryTicket,
        result: Result<Vec<ConsultationRecord>, ConsultationError>,
    ) -> bool {
        if ticket.seq != self.latest_seq {
            warn!(
                "Discarding stale consultation response for {} (seq {}, latest {})",
                ticket.date, ticket.seq, self.latest_seq
            );
            return false;
        }

        match result {
            Ok(records) => {
                self.status = if records.is_empty() {
                    ListStatus::Empty
                } else {
                    ListStatus::Loaded
                };
                self.records = records;
                self.error = None;
            }
            Err(e) => {
                self.status = ListStatus::Error;
                self.records.clear();
                self.error = Some(e.user_message());
            }
        }

        if let Some(id) = self.expanded {
            if !self.contains(id) {
                self.expanded = None;
            }
        }

        true
    }

    /// Expand `id`, or collapse it when it is already expanded. Returns
    /// whether the record is expanded afterwards.
    pub fn toggle_expand(&mut self, id: i64) -> Result<bool, ConsultationError> {
        if !self.contains(id) {
            return Err(ConsultationError::UnknownRecord(id));
        }

        if self.expanded == Some(id) {
            self.expanded = None;
            Ok(false)
        } else {
            self.expanded = Some(id);
            Ok(true)
        }
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let expanded = self
            .expanded
            .and_then(|id| self.records.iter().find(|r| r.id == id))
            .map(render_detail);

        ListSnapshot {
            date: self.date,
            status: self.status,
            error: self.error.clone(),
            total: self.records.len(),
            consultations: self
                .records
                .iter()
                .enumerate()
                .map(|(index, record)| summarize(index, record))
                .collect(),
            expanded,
        }
    }

    fn contains(&self, id: i64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }
}

/// One session's view of the consultation list: the access gate plus the
/// list currently on screen. Locks are never held across a backend call.
pub struct ConsultationBrowser {
    gate: Mutex<AccessGate>,
    view: Mutex<ListView>,
    service: Arc<ConsultationQueryService>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ConsultationBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsultationBrowser").finish_non_exhaustive()
    }
}

impl ConsultationBrowser {
    pub fn new(
        service: Arc<ConsultationQueryService>,
        clock: Arc<dyn Clock>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            gate: Mutex::new(AccessGate::restore(storage)),
            view: Mutex::new(ListView::new()),
            service,
            clock,
        }
    }

    pub async fn authorize(&self, passphrase: &str) -> Result<(), ConsultationError> {
        let mut gate = self.gate.lock().await;
        if gate.authorize(passphrase) {
            Ok(())
        } else {
            let message = gate.error().unwrap_or_default().to_string();
            Err(ConsultationError::Auth(message))
        }
    }

    pub async fn is_authorized(&self) -> bool {
        self.gate.lock().await.is_authorized()
    }

    /// Replace the list with the consultations recorded for `date`.
    ///
    /// A fetch failure is not an `Err`: it lands in the view as
    /// `ListStatus::Error` and the returned snapshot carries the message.
    pub async fn select_date(&self, date: NaiveDate) -> Result<ListSnapshot, ConsultationError> {
        if !self.is_authorized().await {
            return Err(ConsultationError::Unauthorized);
        }

        let ticket = self.view.lock().await.begin(date);
        debug!("Issued consultation query {} for {}", ticket.seq, date);

        let result = self.service.list_by_date(date).await;

        let mut view = self.view.lock().await;
        view.complete(ticket, result);
        Ok(view.snapshot())
    }

    pub async fn show_today(&self) -> Result<ListSnapshot, ConsultationError> {
        self.select_date(self.clock.today()).await
    }

    pub async fn toggle_expand(&self, id: i64) -> Result<ListSnapshot, ConsultationError> {
        if !self.is_authorized().await {
            return Err(ConsultationError::Unauthorized);
        }

        let mut view = self.view.lock().await;
        view.toggle_expand(id)?;
        Ok(view.snapshot())
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.view.lock().await.snapshot()
    }
}
