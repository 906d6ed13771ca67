use std::time::Duration;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use resilience::RetryConfig;
use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};
use crate::models::Session;

pub const DEFAULT_API_ORIGIN: &str = "https://pranav-social-media.onrender.com";
pub const DEFAULT_WS_URL: &str = "wss://pranav-social-media.onrender.com/ws";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // REST backend origin, without a trailing path
    pub api_origin: String,

    // Realtime channel endpoint
    pub ws_url: String,

    // Value of the `token` auth cookie issued at login
    #[serde(default)]
    pub auth_token: Option<String>,

    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,

    pub reconnect: ReconnectConfig,

    // Observability
    pub log_json: bool,

    // Identity used by the headless binary
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
    /// 0 = keep reconnecting until the session ends
    pub max_attempts: u32,
    pub jitter: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl From<SessionConfig> for Session {
    fn from(cfg: SessionConfig) -> Self {
        Session {
            user_id: cfg.user_id,
            username: cfg.username,
            profile_picture: cfg.profile_picture,
        }
    }
}

impl Config {
    /// Load from defaults, an optional `config.{toml,json,yaml}` and
    /// `SOCIAL_CLIENT__*` environment variables (in increasing precedence).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("SOCIAL_CLIENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub(crate) fn defaults() -> std::result::Result<ConfigBuilder<DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("api_origin", DEFAULT_API_ORIGIN)?
            .set_default("ws_url", DEFAULT_WS_URL)?
            .set_default("request_timeout_ms", 15_000)?
            .set_default("connect_timeout_ms", 10_000)?
            .set_default("reconnect.initial_backoff_ms", 500)?
            .set_default("reconnect.max_backoff_ms", 30_000)?
            .set_default("reconnect.multiplier", 2.0)?
            .set_default("reconnect.max_attempts", 0)?
            .set_default("reconnect.jitter", true)?
            .set_default("log_json", false)
    }

    pub fn validate(&self) -> Result<()> {
        let origin = Url::parse(&self.api_origin)?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "api_origin must be http(s), got {}",
                origin.scheme()
            )));
        }

        let ws = Url::parse(&self.ws_url)?;
        if !matches!(ws.scheme(), "ws" | "wss") {
            return Err(ClientError::Config(format!(
                "ws_url must be ws(s), got {}",
                ws.scheme()
            )));
        }

        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(ClientError::Config("timeouts must be greater than 0".into()));
        }

        if self.reconnect.multiplier < 1.0 {
            return Err(ClientError::Config(
                "reconnect.multiplier must be at least 1.0".into(),
            ));
        }

        if self.reconnect.initial_backoff_ms > self.reconnect.max_backoff_ms {
            return Err(ClientError::Config(
                "reconnect.initial_backoff_ms exceeds reconnect.max_backoff_ms".into(),
            ));
        }

        if let Some(session) = &self.session {
            if session.user_id.trim().is_empty() {
                return Err(ClientError::Config("session.user_id is empty".into()));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_policy(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.reconnect.max_attempts,
            initial_backoff: Duration::from_millis(self.reconnect.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.reconnect.max_backoff_ms),
            backoff_multiplier: self.reconnect.multiplier,
            jitter: self.reconnect.jitter,
        }
    }
}
