/// Preset configurations for the client's outbound surfaces
use crate::retry::RetryConfig;
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Configuration bundle for one kind of outbound call
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout: TimeoutConfig,
    pub retry: RetryConfig,
}

/// Realtime WebSocket channel
///
/// - Timeout: 10s for the opening handshake
/// - Retry: reconnect from 500ms up to 30s, ±30% jitter
pub fn realtime_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(10),
        },
        retry: RetryConfig {
            max_retries: 0, // callers use Backoff::unbounded()
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        },
    }
}

/// Idempotent REST reads (history, suggested users)
///
/// - Timeout: 15s
/// - Retry: 3 attempts with exponential backoff
pub fn http_read_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(15),
        },
        retry: RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
        },
    }
}

/// REST writes (send message, comment, like, post CRUD)
///
/// - Timeout: 15s
/// - No retry (avoid duplicate messages and double toggles)
pub fn http_write_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(15),
        },
        retry: RetryConfig {
            max_retries: 0,
            ..Default::default()
        },
    }
}
