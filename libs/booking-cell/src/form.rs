use tracing::debug;

use shared_models::Banner;

use crate::models::{Attachment, ConsultationRequest, SubmissionError, SUCCESS_MESSAGE};
use crate::services::submission::BookingService;

/// State of the booking screen between user actions.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub request: ConsultationRequest,
    pub attachment: Option<Attachment>,
    loading: bool,
    banner: Option<Banner>,
}

impl BookingForm {
    pub fn with_values(request: ConsultationRequest, attachment: Option<Attachment>) -> Self {
        Self {
            request,
            attachment,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Submit the current values. Success clears every field and the
    /// attachment; failure keeps them for a retry. Either way the outcome is
    /// left in the banner.
    pub async fn submit(&mut self, service: &BookingService) -> Result<(), SubmissionError> {
        self.loading = true;
        self.banner = None;

        let result = service.submit(&self.request, self.attachment.as_ref()).await;
        self.loading = false;

        match &result {
            Ok(()) => {
                self.request = ConsultationRequest::default();
                self.attachment = None;
                self.banner = Some(Banner::success(SUCCESS_MESSAGE));
            }
            Err(e) => {
                debug!("Booking kept for retry: {}", e);
                self.banner = Some(Banner::error(e.user_message()));
            }
        }

        result
    }
}
