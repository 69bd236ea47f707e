//! Settings / Configuration.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Names of environments for whatsapp-connect-server.
/// Overrides serialization to force lower case in settings and
/// environment variables
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    /// Local environment (local testing).
    Local,
    /// Official Develop environment.
    Dev,
    /// Official environment.
    Staging,
    /// Official Production environment.
    Prod,
}

/// Implement display to force environment to lower case
impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

/// Server settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    /// Server [AppEnvironment].
    pub environment: AppEnvironment,
    /// Server port.
    pub port: u16,
    /// Server timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Hosted credential table settings.
///
/// The table is read through its PostgREST interface.
#[derive(Clone, Deserialize)]
pub struct Store {
    /// Base URL of the hosted database, without the `/rest/v1` suffix.
    pub url: String,
    /// Service role or anon key, sent as `apikey` and bearer token.
    pub api_key: String,
    /// Table holding one row per client.
    #[serde(default = "default_table")]
    pub table: String,
    /// Column matched against the submitted email.
    #[serde(default = "default_email_field")]
    pub email_field: String,
    /// Column holding the messaging API token.
    #[serde(default = "default_token_field")]
    pub token_field: String,
    /// Column holding the instance's phone number.
    #[serde(default = "default_phone_field")]
    pub phone_field: String,
    /// Client timeout in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("Store")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("email_field", &self.email_field)
            .field("token_field", &self.token_field)
            .field("phone_field", &self.phone_field)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Store {
    /// Client timeout as a [Duration].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_table() -> String {
    "configs".to_string()
}

fn default_email_field() -> String {
    "client_email".to_string()
}

fn default_token_field() -> String {
    "token_uazapi".to_string()
}

fn default_phone_field() -> String {
    "agent_phone".to_string()
}

fn default_store_timeout_ms() -> u64 {
    10_000
}

/// Messaging API settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Messaging {
    /// Full URL of the instance "connect" endpoint.
    pub connect_url: String,
    /// Upper bound for a connect call, in milliseconds.
    #[serde(default = "default_messaging_timeout_ms")]
    pub timeout_ms: u64,
}

impl Messaging {
    /// Connect call timeout as a [Duration].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_messaging_timeout_ms() -> u64 {
    30_000
}

#[derive(Clone, Debug, Deserialize)]
/// Application settings.
pub struct Settings {
    /// Server settings
    pub server: Server,
    /// Credential store settings
    pub store: Store,
    /// Messaging API settings
    pub messaging: Messaging,
    /// The path where the settings file resides.
    /// This can't actually be configured in the settings file itself, for obvious reasons.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load settings.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path
            .unwrap_or(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/settings.toml"));
        // inject environment variables naming them properly on the settings
        // e.g. [store] api_key="foo"
        // would be injected with environment variable WHATSAPP_CONNECT__STORE__API_KEY="foo"
        let s = Config::builder()
            .add_source(File::with_name(&path.as_path().display().to_string()))
            .add_source(
                Environment::with_prefix("WHATSAPP_CONNECT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let mut settings: Self = s.try_deserialize()?;
        settings.path = Some(path);
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Tidy up values that commonly arrive with stray characters from
    /// `.env` files and dashboards.
    fn normalize(&mut self) {
        self.store.url = trim_url(&self.store.url);
        self.store.api_key = clean_secret(&self.store.api_key);
        self.messaging.connect_url = trim_url(&self.messaging.connect_url);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.is_empty() {
            return Err(ConfigError::Message("store.url is not configured".into()));
        }
        if self.store.api_key.is_empty() {
            return Err(ConfigError::Message(
                "store.api_key is not configured".into(),
            ));
        }
        if self.messaging.connect_url.is_empty() {
            return Err(ConfigError::Message(
                "messaging.connect_url is not configured".into(),
            ));
        }
        Ok(())
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn clean_secret(secret: &str) -> String {
    secret
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            server: Server {
                environment: AppEnvironment::Local,
                port: 5000,
                timeout_ms: 1_000,
            },
            store: Store {
                url: " https://db.example.com/ ".to_string(),
                api_key: " \"secret-key\" ".to_string(),
                table: default_table(),
                email_field: default_email_field(),
                token_field: default_token_field(),
                phone_field: default_phone_field(),
                timeout_ms: default_store_timeout_ms(),
            },
            messaging: Messaging {
                connect_url: "https://api.example.com/instance/connect/".to_string(),
                timeout_ms: default_messaging_timeout_ms(),
            },
            path: None,
        }
    }

    #[test]
    fn test_normalize_strips_slashes_and_quotes() {
        let mut settings = settings();
        settings.normalize();

        assert_eq!(settings.store.url, "https://db.example.com");
        assert_eq!(settings.store.api_key, "secret-key");
        assert_eq!(
            settings.messaging.connect_url,
            "https://api.example.com/instance/connect"
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_single_quoted_secret() {
        assert_eq!(clean_secret("'abc'"), "abc");
        assert_eq!(clean_secret("abc"), "abc");
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let mut settings = settings();
        settings.store.api_key = " '' ".to_string();
        settings.normalize();

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("store.api_key"));
    }

    #[test]
    fn test_empty_store_url_is_rejected() {
        let mut settings = settings();
        settings.store.url = "/".to_string();
        settings.normalize();

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("store.url"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = settings();
        let debug = format!("{:?}", settings.store);

        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_default_timeouts() {
        let settings = settings();

        assert_eq!(settings.store.timeout(), Duration::from_millis(10_000));
        assert_eq!(settings.messaging.timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn test_load_bundled_settings_file() {
        let settings = Settings::load(None).unwrap();

        assert_eq!(settings.store.table, "configs");
        assert_eq!(settings.store.token_field, "token_uazapi");
        assert!(settings.path.is_some());
    }
}
