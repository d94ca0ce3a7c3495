// Consultation Cell - passphrase-gated browser of consultations by date
pub mod browser;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod session;

pub use browser::{ConsultationBrowser, ListView, QueryTicket};
pub use models::{
    ConsultationDetail, ConsultationError, ConsultationSummary, ListSnapshot, ListStatus,
};
pub use router::{consultation_routes, ConsultationState};
pub use services::access::{AccessGate, MemorySessionStorage, SessionStorage, ACCESS_PASSPHRASE};
pub use services::listing::ConsultationQueryService;
pub use session::{SessionId, SessionRegistry};
