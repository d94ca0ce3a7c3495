pub mod attachment;
pub mod submission;

pub use attachment::{sanitize_filename, screen_attachment, storage_path, ScreenedAttachment};
pub use submission::BookingService;
