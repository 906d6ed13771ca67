use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use event_schema::{decode_inbound, InboundEvent, SchemaError};
use tracing::{debug, info, warn};

use super::presence::{PresenceHub, PresenceSet};
use crate::models::{LikeNotification, Message, NotificationId};
use crate::store::{Action, Store, StoreEvent};

/// Turns realtime frames into store actions.
///
/// Frames read by a connection carry that connection's generation. Once the
/// connection is superseded (stop or restart) its frames are dropped, checked
/// under the store lock so a late frame cannot land after the reset.
#[derive(Clone)]
pub struct EventDispatcher {
    store: Store,
    presence: PresenceHub,
    generation: Arc<AtomicU64>,
}

impl EventDispatcher {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            presence: PresenceHub::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn presence_hub(&self) -> &PresenceHub {
        &self.presence
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate every earlier connection and return the new generation
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, generation: Option<u64>, action: Action) -> Option<StoreEvent> {
        match generation {
            None => self.store.dispatch(action),
            Some(g) => self
                .store
                .dispatch_if(action, || self.generation.load(Ordering::SeqCst) == g),
        }
    }

    /// Decode and apply one text frame. Frames that fail to decode are
    /// logged and dropped; they never tear down the connection.
    pub fn handle_frame(&self, text: &str) {
        self.handle_frame_in(None, text);
    }

    /// Same as [`handle_frame`](Self::handle_frame), for a frame read by the
    /// connection of `generation`
    pub fn handle_connection_frame(&self, generation: u64, text: &str) {
        self.handle_frame_in(Some(generation), text);
    }

    fn handle_frame_in(&self, generation: Option<u64>, text: &str) {
        match decode_inbound(text) {
            Ok(event) => self.handle_event_in(generation, event),
            Err(SchemaError::UnknownEvent(name)) => {
                warn!(event = %name, "Ignoring unknown realtime event");
            }
            Err(e) => {
                warn!(error = %e, "Ignoring malformed realtime frame");
            }
        }
    }

    pub fn handle_event(&self, event: InboundEvent) {
        self.handle_event_in(None, event);
    }

    fn handle_event_in(&self, generation: Option<u64>, event: InboundEvent) {
        debug!(event = event.event_type(), "Realtime event received");
        match event {
            InboundEvent::NewMessage(record) => {
                self.message_in(generation, record.into());
            }
            InboundEvent::OnlineUsers(ids) => self.presence_in(generation, ids),
            InboundEvent::Notification(record) => self.notification_in(generation, record.into()),
        }
    }

    /// Append to the conversation with the other participant.
    /// Returns false when the message id was already present.
    pub fn on_message_received(&self, message: Message) -> bool {
        self.message_in(None, message)
    }

    fn message_in(&self, generation: Option<u64>, message: Message) -> bool {
        let id = message.id.clone();
        let appended = self
            .apply(generation, Action::MessageAppended(message))
            .is_some();
        if !appended {
            debug!(message_id = %id, "Message not appended");
        }
        appended
    }

    pub fn on_like_notification(&self, notification: LikeNotification) {
        self.notification_in(None, notification);
    }

    fn notification_in(&self, generation: Option<u64>, notification: LikeNotification) {
        info!(
            actor = %notification.actor_user_id,
            post_id = %notification.post_id,
            kind = ?notification.kind,
            "Like notification received"
        );
        self.apply(generation, Action::LikeNotificationReceived(notification));
    }

    /// Replace the online set and tell every presence handler
    pub fn on_presence_broadcast(&self, ids: Vec<String>) {
        self.presence_in(None, ids);
    }

    fn presence_in(&self, generation: Option<u64>, ids: Vec<String>) {
        let set = PresenceSet::from_broadcast(ids);
        debug!(online = set.len(), "Presence broadcast");
        if self
            .apply(generation, Action::PresenceReplaced(set.clone()))
            .is_some()
        {
            self.presence.notify(&set);
        } else {
            debug!("Presence from a superseded connection dropped");
        }
    }

    /// Back to "never received"; handlers are only told when something changed
    pub fn reset_presence(&self) {
        self.reset_presence_in(None);
    }

    /// Reset on behalf of the connection of `generation`; a no-op once a
    /// newer connection owns presence
    pub fn reset_connection_presence(&self, generation: u64) {
        self.reset_presence_in(Some(generation));
    }

    fn reset_presence_in(&self, generation: Option<u64>) {
        if self.apply(generation, Action::PresenceCleared).is_some() {
            self.presence.notify(&PresenceSet::default());
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.store.select(|s| s.chat.presence.is_online(user_id))
    }

    pub fn clear_notifications(&self) {
        self.store.dispatch(Action::NotificationsCleared);
    }

    pub fn acknowledge(&self, ids: &[NotificationId]) {
        self.store
            .dispatch(Action::NotificationsAcknowledged(ids.to_vec()));
    }

    pub fn unread_count(&self) -> usize {
        self.store.select(|s| s.notifications.unread_count())
    }
}
