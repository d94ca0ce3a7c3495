use std::sync::Arc;

use tracing::{debug, error, info, warn};

use shared_database::{BackendClient, BackendError, UploadOptions};
use shared_models::CONSULTATION_TABLE;
use shared_utils::Clock;

use crate::models::{Attachment, ConsultationRequest, SubmissionError};
use crate::services::attachment::{screen_attachment, storage_path, ScreenedAttachment};

/// Runs a booking as one logical transaction: upload the attachment (if
/// any), then insert the consultation row referencing its public URL.
///
/// There is no compensation step. When the insert fails after a successful
/// upload the blob stays in the bucket unreferenced.
pub struct BookingService {
    backend: Arc<dyn BackendClient>,
    clock: Arc<dyn Clock>,
    bucket: String,
}

impl BookingService {
    pub fn new(backend: Arc<dyn BackendClient>, clock: Arc<dyn Clock>, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            clock,
            bucket: bucket.into(),
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub async fn submit(
        &self,
        request: &ConsultationRequest,
        attachment: Option<&Attachment>,
    ) -> Result<(), SubmissionError> {
        // Local checks, no network before both pass
        let validated = request.validate(self.clock.today())?;
        let screened = attachment.map(screen_attachment).transpose()?;

        let attachment_url = match (attachment, screened) {
            (Some(file), Some(screened)) => Some(self.upload(file, &screened).await?),
            _ => None,
        };

        let uploaded = attachment_url.is_some();
        let record = validated.into_record(attachment_url);
        debug!("Inserting consultation for {} on {}", record.name, record.requested_date);

        let fields = serde_json::to_value(&record)
            .map_err(|e| SubmissionError::PersistenceFailed(BackendError::from(e)))?;

        if let Err(e) = self.backend.insert_record(CONSULTATION_TABLE, fields).await {
            error!("Consultation insert failed: {}", e);
            if uploaded {
                warn!("Attachment left unreferenced in bucket {}", self.bucket);
            }
            return Err(SubmissionError::PersistenceFailed(e));
        }

        info!("Consultation booked for {}", record.requested_date);
        Ok(())
    }

    async fn upload(&self, file: &Attachment, screened: &ScreenedAttachment) -> Result<String, SubmissionError> {
        let path = storage_path(self.clock.now_millis(), &screened.safe_name);
        let options = UploadOptions::new(screened.media_type.mime());

        debug!("Uploading attachment {} as {}", file.file_name, path);

        self.backend
            .upload_blob(&self.bucket, &path, file.bytes.clone(), &options)
            .await
            .map_err(|e| {
                error!("Attachment upload failed: {}", e);
                SubmissionError::UploadFailed(e)
            })?;

        Ok(self.backend.public_url(&self.bucket, &path))
    }
}
