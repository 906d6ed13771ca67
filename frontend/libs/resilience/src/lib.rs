/// Resilience patterns for the social client
///
/// This library provides the small set of resilience patterns the client needs:
/// - **Backoff**: Exponential backoff with jitter, driven step by step (used by the realtime reconnect loop)
/// - **Retry**: `with_retry` / `with_retry_if` for idempotent reads
/// - **Timeout**: Enforces time limits on handshakes and requests
/// - **Preset Configurations**: Pre-tuned settings for the realtime channel and REST calls
///
/// # Example: Reconnect loop
///
/// ```rust,no_run
/// use resilience::{presets, Backoff};
///
/// #[tokio::main]
/// async fn main() {
///     let mut backoff = Backoff::new(presets::realtime_config().retry).unbounded();
///
///     while let Some(delay) = backoff.next_delay() {
///         tokio::time::sleep(delay).await;
///         // Try to connect; call backoff.reset() once connected
///     }
/// }
/// ```
///
/// # Example: Idempotent read with retry
///
/// ```rust,no_run
/// use resilience::{presets, with_retry};
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::http_read_config();
///
///     let result = with_retry(config.retry, || async {
///         // Your GET request here
///         Ok::<_, String>(())
///     }).await;
/// }
/// ```

pub mod presets;
pub mod retry;
pub mod timeout;

// Re-export main types for convenience
pub use presets::{http_read_config, http_write_config, realtime_config, ServiceConfig};
pub use retry::{with_retry, with_retry_if, Backoff, RetryConfig, RetryError};
pub use timeout::{with_timeout, with_timeout_result, TimeoutConfig, TimeoutError};
