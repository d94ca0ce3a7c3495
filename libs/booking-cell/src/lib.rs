// Booking Cell - consultation request form, attachment screening and the
// upload-then-insert submission flow.
pub mod form;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use form::BookingForm;
pub use models::{
    Attachment, AttachmentPayload, BookingPayload, BookingResponse, ConsultationRequest,
    MediaType, SubmissionError, MAX_ATTACHMENT_BYTES, MAX_REQUEST_BYTES,
};
pub use router::{booking_routes, BookingState};
pub use services::submission::BookingService;
