//! Backend configuration from environment variables.

use thiserror::Error;

/// Bucket used for avatar uploads unless `AVATAR_BUCKET` says otherwise.
pub const DEFAULT_AVATAR_BUCKET: &str = "avatars";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },
}

/// Where the hosted backend lives and how to address it anonymously.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub avatar_bucket: String,
}

impl BackendConfig {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: "expected an http(s) URL",
            });
        }
        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_ANON_KEY"));
        }
        Ok(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
            avatar_bucket: DEFAULT_AVATAR_BUCKET.to_string(),
        })
    }

    pub fn with_avatar_bucket(mut self, bucket: &str) -> Self {
        self.avatar_bucket = bucket.to_string();
        self
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `AVATAR_BUCKET`.
    ///
    /// A `.env` file is honoured when present. Values baked in at compile
    /// time are used when the runtime environment has none, which is the
    /// only option in the browser.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let compiled = [
            ("SUPABASE_URL", option_env!("SUPABASE_URL")),
            ("SUPABASE_ANON_KEY", option_env!("SUPABASE_ANON_KEY")),
            ("AVATAR_BUCKET", option_env!("AVATAR_BUCKET")),
        ];
        Self::from_lookup(|name| {
            std::env::var(name).ok().or_else(|| {
                compiled
                    .iter()
                    .find(|(key, _)| *key == name)
                    .and_then(|(_, value)| value.map(str::to_string))
            })
        })
    }

    /// Like [`from_env`](Self::from_env), but an unconfigured environment
    /// yields `None` so the app can still start without a backend.
    pub fn from_env_optional() -> Option<Self> {
        match Self::from_env() {
            Ok(config) => Some(config),
            Err(ConfigError::Missing(name)) => {
                tracing::warn!("{name} not set, remote backend disabled");
                None
            }
            Err(e) => {
                tracing::error!("Invalid backend configuration: {e}");
                None
            }
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = value("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let anon_key = value("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;
        let config = Self::new(&url, &anon_key)?;

        Ok(match value("AVATAR_BUCKET") {
            Some(bucket) => config.with_avatar_bucket(&bucket),
            None => config,
        })
    }
}
