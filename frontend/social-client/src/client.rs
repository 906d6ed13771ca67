use tracing::{error, info};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::{NotificationId, Session};
use crate::realtime::connection::connection_user_id;
use crate::realtime::{
    ConnectionManager, ConnectionSettings, ConnectionState, EventDispatcher, PresenceSet,
};
use crate::services::{ChatService, PostService};
use crate::store::{Action, Store};

/// Entry point wiring the store, the realtime connection and the REST services.
///
/// The realtime connection lives exactly as long as the session: it is
/// acquired by [`begin_session`](Self::begin_session) and released by
/// [`end_session`](Self::end_session), [`logout`](Self::logout) or drop.
pub struct SocialClient {
    store: Store,
    api: ApiClient,
    dispatcher: EventDispatcher,
    connection: ConnectionManager,
    chat: ChatService,
    posts: PostService,
}

impl SocialClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api = ApiClient::new(config)?;
        Ok(Self::with_parts(api, ConnectionSettings::from_config(config)))
    }

    pub fn with_parts(api: ApiClient, settings: ConnectionSettings) -> Self {
        let store = Store::new();
        let dispatcher = EventDispatcher::new(store.clone());
        let connection = ConnectionManager::new(settings, dispatcher.clone());

        Self {
            chat: ChatService::new(api.clone(), store.clone()),
            posts: PostService::new(api.clone(), store.clone()),
            store,
            api,
            dispatcher,
            connection,
        }
    }

    /// Store the session and open its realtime connection.
    ///
    /// Switching to a different user first ends the current session, so none
    /// of the previous user's state survives.
    /// Beginning again as the same user only restarts the connection.
    pub fn begin_session(&self, session: Session) -> Result<()> {
        let user_id = connection_user_id(&session)?;
        if let Some(previous) = self.store.session_user_id() {
            if previous != user_id {
                info!(%previous, next = %user_id, "Switching session user");
                self.end_session();
            }
        }

        self.connection.start(&session)?;
        info!(user_id = %session.user_id, "Session started");
        self.store.dispatch(Action::SetSession(Some(session)));
        Ok(())
    }

    /// Close the realtime connection and reset all client state
    pub fn end_session(&self) {
        self.connection.stop();
        self.store.dispatch(Action::SessionEnded);
        info!("Session ended");
    }

    /// Log out on the backend; local state is only torn down on success
    pub async fn logout(&self) -> Result<Option<String>> {
        match self.api.logout().await {
            Ok(message) => {
                self.end_session();
                Ok(message)
            }
            Err(e) => {
                error!(error = %e, "Logout failed");
                Err(e)
            }
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn watch_connection(&self) -> tokio::sync::watch::Receiver<ConnectionState> {
        self.connection.watch_state()
    }

    pub fn on_presence_update<F>(&self, slot: impl Into<String>, handler: F)
    where
        F: Fn(&PresenceSet) + Send + Sync + 'static,
    {
        self.connection.on_presence_update(slot, handler);
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.connection.is_online(user_id)
    }

    pub fn unread_count(&self) -> usize {
        self.dispatcher.unread_count()
    }

    pub fn clear_notifications(&self) {
        self.dispatcher.clear_notifications();
    }

    pub fn acknowledge_notifications(&self, ids: &[NotificationId]) {
        self.dispatcher.acknowledge(ids);
    }
}
