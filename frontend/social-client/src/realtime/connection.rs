use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use event_schema::{encode_outbound, OutboundEvent};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use resilience::{with_timeout, Backoff, RetryConfig};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

use super::dispatcher::EventDispatcher;
use super::presence::PresenceSet;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::{Session, UserId};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never started
    Idle,
    Connecting,
    Connected,
    /// Waiting before reconnect attempt `attempt`
    Reconnecting { attempt: u32 },
    Closed,
}

/// Everything the connection task needs from the configuration
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub ws_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub reconnect: RetryConfig,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
            auth_token: config.auth_token.clone(),
            connect_timeout: config.connect_timeout(),
            reconnect: config.reconnect_policy(),
        }
    }
}

struct RunningTask {
    handle: JoinHandle<()>,
    active: Arc<AtomicBool>,
}

/// Owns at most one realtime connection at a time.
///
/// `start` acquires the connection for a session, `stop` releases it, and
/// dropping the manager releases it too.
pub struct ConnectionManager {
    settings: ConnectionSettings,
    dispatcher: EventDispatcher,
    state: Arc<watch::Sender<ConnectionState>>,
    task: Mutex<Option<RunningTask>>,
}

impl ConnectionManager {
    pub fn new(settings: ConnectionSettings, dispatcher: EventDispatcher) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            settings,
            dispatcher,
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    /// Open the connection for `session`, closing any previous one first.
    ///
    /// Returns once the connection task is spawned; progress is observable
    /// through [`watch_state`](Self::watch_state).
    pub fn start(&self, session: &Session) -> Result<()> {
        let user_id = connection_user_id(session)?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ClientError::Config(format!("no tokio runtime: {e}")))?;

        self.stop();

        let generation = self.dispatcher.next_generation();
        let active = Arc::new(AtomicBool::new(true));
        self.state.send_replace(ConnectionState::Connecting);

        let handle = runtime.spawn(run_connection(
            self.settings.clone(),
            self.dispatcher.clone(),
            user_id.clone(),
            self.state.clone(),
            active.clone(),
            generation,
        ));

        *self.task.lock() = Some(RunningTask { handle, active });
        info!(user_id = %user_id, generation, "Realtime connection started");
        Ok(())
    }

    /// Close the connection and forget presence. Safe to call repeatedly.
    ///
    /// Frames the old task is still handling are dropped once the generation
    /// moves on, so nothing repopulates presence after the reset.
    pub fn stop(&self) {
        let task = self.task.lock().take();
        self.dispatcher.next_generation();

        let Some(task) = task else {
            self.dispatcher.reset_presence();
            return;
        };

        task.active.store(false, Ordering::SeqCst);
        task.handle.abort();
        self.dispatcher.reset_presence();
        self.state.send_replace(ConnectionState::Closed);
        info!("Realtime connection stopped");
    }

    /// Register the presence handler for `slot`, replacing the previous one
    pub fn on_presence_update<F>(&self, slot: impl Into<String>, handler: F)
    where
        F: Fn(&PresenceSet) + Send + Sync + 'static,
    {
        self.dispatcher.presence_hub().register(slot, handler);
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.dispatcher.is_online(user_id)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The id a session connects and registers under
pub(crate) fn connection_user_id(session: &Session) -> Result<UserId> {
    let user_id = session.user_id.trim();
    if user_id.is_empty() {
        return Err(ClientError::Validation(
            "session user id must not be empty".into(),
        ));
    }
    Ok(user_id.to_string())
}

async fn run_connection(
    settings: ConnectionSettings,
    dispatcher: EventDispatcher,
    user_id: UserId,
    state: Arc<watch::Sender<ConnectionState>>,
    active: Arc<AtomicBool>,
    generation: u64,
) {
    let mut backoff = Backoff::new(settings.reconnect.clone());
    if settings.reconnect.max_retries == 0 {
        backoff = backoff.unbounded();
    }

    loop {
        match connect(&settings, &user_id).await {
            Ok(stream) => {
                backoff.reset();
                state.send_replace(ConnectionState::Connected);
                info!(user_id = %user_id, "Realtime channel connected");

                match pump(stream, &dispatcher, &user_id, &active, generation).await {
                    Ok(()) => info!("Realtime channel closed by server"),
                    Err(e) => warn!(error = %e, "Realtime channel dropped"),
                }
            }
            Err(e) => warn!(error = %e, "Realtime connect failed"),
        }

        // Presence is only meaningful while connected
        dispatcher.reset_connection_presence(generation);

        if !active.load(Ordering::SeqCst) {
            break;
        }

        let Some(delay) = backoff.next_delay() else {
            error!(
                attempts = backoff.attempt(),
                "Giving up on realtime channel after max reconnect attempts"
            );
            break;
        };

        let attempt = backoff.attempt();
        state.send_replace(ConnectionState::Reconnecting { attempt });
        warn!(attempt, ?delay, "Reconnecting realtime channel");
        tokio::time::sleep(delay).await;
        state.send_replace(ConnectionState::Connecting);
    }

    state.send_replace(ConnectionState::Closed);
}

async fn connect(settings: &ConnectionSettings, user_id: &str) -> Result<WsStream> {
    let mut url = Url::parse(&settings.ws_url)?;
    url.query_pairs_mut().append_pair("userId", user_id);

    let mut request = url.as_str().into_client_request()?;
    if let Some(token) = &settings.auth_token {
        let cookie = HeaderValue::from_str(&format!("token={token}"))
            .map_err(|e| ClientError::Config(format!("invalid auth token: {e}")))?;
        request.headers_mut().insert(COOKIE, cookie);
    }

    debug!(url = %url, "Connecting realtime channel");
    let (stream, _response) = with_timeout(settings.connect_timeout, connect_async(request))
        .await
        .map_err(|e| ClientError::Timeout(e.to_string()))??;

    Ok(stream)
}

/// Register, then feed frames to the dispatcher until the channel ends
async fn pump(
    stream: WsStream,
    dispatcher: &EventDispatcher,
    user_id: &str,
    active: &AtomicBool,
    generation: u64,
) -> Result<()> {
    let (mut write, mut read) = stream.split();

    let register = encode_outbound(&OutboundEvent::Register {
        user_id: user_id.to_string(),
    });
    write.send(WsMessage::Text(register.into())).await?;
    debug!(user_id, "Presence registration sent");

    while let Some(frame) = read.next().await {
        if !active.load(Ordering::SeqCst) {
            break;
        }

        match frame? {
            WsMessage::Text(text) => dispatcher.handle_connection_frame(generation, text.as_str()),
            WsMessage::Close(reason) => {
                debug!(?reason, "Close frame received");
                break;
            }
            WsMessage::Binary(bytes) => {
                debug!(len = bytes.len(), "Ignoring binary frame");
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn manager() -> ConnectionManager {
        let settings = ConnectionSettings {
            ws_url: "ws://127.0.0.1:9/ws".into(),
            auth_token: None,
            connect_timeout: Duration::from_millis(200),
            reconnect: RetryConfig::default(),
        };
        ConnectionManager::new(settings, EventDispatcher::new(Store::new()))
    }

    #[tokio::test]
    async fn test_start_rejects_empty_user_id() {
        let manager = manager();
        let session = Session {
            user_id: "  ".into(),
            username: "nobody".into(),
            profile_picture: None,
        };

        let err = manager.start(&session).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(manager.state(), ConnectionState::Idle);
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn test_stop_invalidates_running_connection_frames() {
        let manager = manager();
        let session = Session {
            user_id: "u1".into(),
            username: "alice".into(),
            profile_picture: None,
        };
        manager.start(&session).unwrap();
        let running = manager.dispatcher.generation();
        manager.stop();

        // A frame the aborted task was already handling
        manager
            .dispatcher
            .handle_connection_frame(running, r#"{"event":"getOnlineUsers","data":["u2"]}"#);

        assert!(!manager.is_online("u2"));
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let manager = manager();
        manager.stop();
        manager.stop();
        assert_eq!(manager.state(), ConnectionState::Idle);
    }
}
