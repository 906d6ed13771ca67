/// Integration tests for resilience library
use resilience::{
    presets,
    retry::{with_retry_if, Backoff, RetryConfig, RetryError},
    timeout::{with_timeout, TimeoutError},
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ==================== Backoff Tests ====================

#[tokio::test]
async fn test_reconnect_loop_resets_after_success() {
    let config = RetryConfig {
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
        jitter: false,
        ..presets::realtime_config().retry
    };
    let mut backoff = Backoff::new(config).unbounded();

    // Two failed dials, then a successful one
    let outcomes = [false, false, true];
    for connected in outcomes {
        if connected {
            backoff.reset();
            break;
        }
        let delay = backoff.next_delay().expect("unbounded backoff never ends");
        tokio::time::sleep(delay).await;
    }

    assert_eq!(backoff.attempt(), 0);
    assert_eq!(backoff.next_delay(), Some(Duration::from_millis(5)));
}

// ==================== Retry + Timeout Composition ====================

#[tokio::test]
async fn test_timed_out_reads_are_retried() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let config = RetryConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(5),
        jitter: false,
        ..Default::default()
    };

    let result = with_retry_if(
        config,
        move || {
            let attempt = counter_clone.fetch_add(1, Ordering::SeqCst);
            async move {
                with_timeout(Duration::from_millis(20), async move {
                    if attempt == 0 {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                    "history"
                })
                .await
            }
        },
        |e| matches!(e, TimeoutError::Elapsed(_)),
    )
    .await;

    assert_eq!(result.unwrap(), "history");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_write_preset_fails_without_retry() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let result = with_retry_if(
        presets::http_write_config().retry,
        move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("503 Service Unavailable") }
        },
        |_| true,
    )
    .await;

    assert!(matches!(
        result,
        Err(RetryError::MaxRetriesExceeded { retries: 0, .. })
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
