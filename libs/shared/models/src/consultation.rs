use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const CONSULTATION_TABLE: &str = "consulta";
pub const PERSON_RELATION: &str = "persona";

/// Placeholder rendered for every optional field that has no value.
pub const NOT_SPECIFIED: &str = "No especificado";

/// A persisted consultation row. Records are created by the booking form and
/// only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub id: i64,
    // Absent in schemas that normalize identity into `persona`
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "empresa", default)]
    pub employer: Option<String>,
    #[serde(rename = "cargo", default)]
    pub job_title: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "numero_documento", default)]
    pub document_number: Option<String>,
    #[serde(rename = "fecha_consulta")]
    pub requested_date: NaiveDate,
    #[serde(rename = "motivo", default)]
    pub notes: Option<String>,
    #[serde(rename = "archivo_url", default)]
    pub attachment_url: Option<String>,
    #[serde(rename = "creado_en", default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "persona", default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "empresa", default)]
    pub employer: Option<String>,
    #[serde(rename = "cargo", default)]
    pub job_title: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
}

impl ConsultationRecord {
    pub fn resolved_name(&self) -> Option<&str> {
        self.resolve(|p| p.name.as_deref(), self.name.as_deref())
    }

    pub fn resolved_email(&self) -> Option<&str> {
        self.resolve(|p| p.email.as_deref(), self.email.as_deref())
    }

    pub fn resolved_employer(&self) -> Option<&str> {
        self.resolve(|p| p.employer.as_deref(), self.employer.as_deref())
    }

    pub fn resolved_job_title(&self) -> Option<&str> {
        self.resolve(|p| p.job_title.as_deref(), self.job_title.as_deref())
    }

    pub fn resolved_phone(&self) -> Option<&str> {
        self.resolve(|p| p.phone.as_deref(), self.phone.as_deref())
    }

    // Relation value first, then the flat column, blank strings count as absent
    fn resolve<'a>(
        &'a self,
        from_person: impl Fn(&'a Person) -> Option<&'a str>,
        own: Option<&'a str>,
    ) -> Option<&'a str> {
        self.person
            .as_ref()
            .and_then(from_person)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| own.filter(|value| !value.trim().is_empty()))
    }
}

/// Insert payload for a new consultation. Optional values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConsultation {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "empresa")]
    pub employer: Option<String>,
    #[serde(rename = "cargo")]
    pub job_title: Option<String>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "numero_documento")]
    pub document_number: Option<String>,
    #[serde(rename = "fecha_consulta")]
    pub requested_date: NaiveDate,
    #[serde(rename = "motivo")]
    pub notes: Option<String>,
    #[serde(rename = "archivo_url")]
    pub attachment_url: Option<String>,
}

// `creado_en` arrives as timestamptz (RFC 3339) or as a bare timestamp.
// Anything else reads as unknown rather than failing the whole row.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }

        match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        {
            Ok(naive) => Ok(Some(naive.and_utc())),
            Err(e) => {
                tracing::warn!("Ignoring unreadable creado_en {:?}: {}", raw, e);
                Ok(None)
            }
        }
    }
}
