pub mod backend;
pub mod error;
pub mod relation;
pub mod supabase;

pub use backend::{BackendClient, OrderBy, RecordQuery, UploadOptions};
pub use error::BackendError;
pub use relation::normalize_relation;
pub use supabase::SupabaseClient;
