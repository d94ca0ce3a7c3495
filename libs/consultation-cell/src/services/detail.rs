use chrono::{DateTime, NaiveDate, Utc};

use shared_models::{ConsultationRecord, NOT_SPECIFIED};

use crate::models::{
    AppointmentSection, ConsultationDetail, ConsultationSummary, EmployeeSection, RequesterSection,
};

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

fn or_placeholder(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// List row for `record`; `index` is zero-based and numbering starts at 1.
pub fn summarize(index: usize, record: &ConsultationRecord) -> ConsultationSummary {
    ConsultationSummary {
        id: record.id,
        position: index + 1,
        name: or_placeholder(record.resolved_name()),
        date: format_date(record.requested_date),
        registered_at: record.created_at.map(format_time),
    }
}

/// Never fails: a missing `persona` relation or an absent column renders as
/// the placeholder.
pub fn render_detail(record: &ConsultationRecord) -> ConsultationDetail {
    ConsultationDetail {
        id: record.id,
        requester: RequesterSection {
            employer: or_placeholder(record.resolved_employer()),
            job_title: or_placeholder(record.resolved_job_title()),
            phone: or_placeholder(record.resolved_phone()),
            email: or_placeholder(record.resolved_email()),
            registered_at: record
                .created_at
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        },
        employee: EmployeeSection {
            name: or_placeholder(record.resolved_name()),
            job_title: or_placeholder(record.resolved_job_title()),
            document_number: or_placeholder(record.document_number.as_deref()),
        },
        appointment: AppointmentSection {
            date: format_date(record.requested_date),
            requested_studies: or_placeholder(record.notes.as_deref()),
        },
        attachment: or_placeholder(record.attachment_url.as_deref()),
    }
}
