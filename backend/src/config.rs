use tracing::info;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Origins starting with this prefix receive CORS headers.
    pub cors_allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origin: DEFAULT_CORS_ORIGIN.into(),
        }
    }
}

impl AppConfig {
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let cors_allowed_origin = match get("CORS_ALLOWED_ORIGIN") {
            Some(origin) if !origin.trim().is_empty() => origin.trim().to_string(),
            _ => {
                info!("CORS_ALLOWED_ORIGIN not set, using default: {}", DEFAULT_CORS_ORIGIN);
                DEFAULT_CORS_ORIGIN.into()
            }
        };

        Self { cors_allowed_origin }
    }
}
