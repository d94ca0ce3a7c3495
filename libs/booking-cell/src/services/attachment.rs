use tracing::warn;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{Attachment, MediaType, SubmissionError, MAX_ATTACHMENT_BYTES};

/// Used when nothing of the original name survives sanitization.
pub const PLACEHOLDER_FILENAME: &str = "archivo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenedAttachment {
    pub media_type: MediaType,
    pub safe_name: String,
}

/// Reject attachments storage must never see: wrong media type first, then
/// size. Runs before any backend call.
pub fn screen_attachment(attachment: &Attachment) -> Result<ScreenedAttachment, SubmissionError> {
    let media_type = MediaType::from_mime(&attachment.media_type).ok_or_else(|| {
        warn!("Rejected attachment {} with media type {}", attachment.file_name, attachment.media_type);
        SubmissionError::UnsupportedFileType(attachment.media_type.clone())
    })?;

    if attachment.size() > MAX_ATTACHMENT_BYTES {
        warn!("Rejected attachment {} of {} bytes", attachment.file_name, attachment.size());
        return Err(SubmissionError::FileTooLarge {
            size: attachment.size(),
            max: MAX_ATTACHMENT_BYTES,
        });
    }

    Ok(ScreenedAttachment {
        media_type,
        safe_name: sanitize_filename(&attachment.file_name),
    })
}

/// Storage-safe version of a user supplied file name.
///
/// Accented letters lose their diacritics (`ñ` -> `n`), everything outside
/// `[A-Za-z0-9._-]` becomes `_`, runs of `_` collapse to one and the result
/// never starts or ends with `_`.
pub fn sanitize_filename(original: &str) -> String {
    let mut safe = String::with_capacity(original.len());

    for c in original.nfd().filter(|c| !is_combining_mark(*c)) {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };

        if c == '_' && safe.ends_with('_') {
            continue;
        }
        safe.push(c);
    }

    let trimmed = safe.trim_matches('_');
    if trimmed.is_empty() {
        PLACEHOLDER_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Object path for an upload. The millisecond prefix keeps names apart in the
/// bucket; two uploads of the same name within one millisecond still collide.
pub fn storage_path(now_millis: i64, safe_name: &str) -> String {
    format!("{}_{}", now_millis, safe_name)
}
