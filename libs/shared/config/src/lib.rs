use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_STORAGE_BUCKET: &str = "archivos";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_bucket: String,
    /// Resolve requester identity through the `persona` relation when listing.
    pub person_relation: bool,
    /// No timeout is applied to backend calls unless this is set.
    pub backend_timeout: Option<Duration>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            storage_bucket: env::var("SUPABASE_STORAGE_BUCKET")
                .ok()
                .filter(|bucket| !bucket.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            person_relation: env::var("SUPABASE_PERSON_RELATION")
                .map(|value| parse_flag(&value))
                .unwrap_or(false),
            backend_timeout: env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|value| match value.trim().parse::<u64>() {
                    Ok(0) => None,
                    Ok(secs) => Some(Duration::from_secs(secs)),
                    Err(_) => {
                        warn!("BACKEND_TIMEOUT_SECS is not a number, ignoring: {}", value);
                        None
                    }
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
