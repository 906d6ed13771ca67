//! Application state container
//!
//! One `AppState` behind a lock, mutated only through typed [`Action`]s. Each
//! reducer reports what changed (or nothing, for no-op actions such as a
//! redelivered message) and subscribers are told about every change through a
//! broadcast channel. Reducers never await, so the write lock is never held
//! across a suspension point.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

pub mod auth;
pub mod chat;
pub mod notifications;
pub mod posts;

pub use auth::AuthState;
pub use chat::ChatState;
pub use notifications::NotificationState;
pub use posts::PostState;

use crate::models::{
    Comment, LikeNotification, Message, NotificationId, Post, PostId, Session, UserId, UserSummary,
};
use crate::realtime::PresenceSet;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub auth: AuthState,
    pub chat: ChatState,
    pub notifications: NotificationState,
    pub posts: PostState,
}

/// Every mutation the application can make
#[derive(Debug, Clone)]
pub enum Action {
    // Auth
    SetSession(Option<Session>),
    SelectUser(Option<UserSummary>),
    SetSuggestedUsers(Vec<UserSummary>),
    /// Logout / session teardown: reset every slice
    SessionEnded,

    // Chat
    /// Inbound or confirmed-sent message; keyed by the non-session participant
    MessageAppended(Message),
    ConversationLoaded {
        counterpart_id: UserId,
        messages: Vec<Message>,
    },
    SetCompose(String),
    ClearCompose,
    PresenceReplaced(PresenceSet),
    PresenceCleared,

    // Notifications
    LikeNotificationReceived(LikeNotification),
    NotificationsAcknowledged(Vec<NotificationId>),
    NotificationsCleared,

    // Posts
    SetPosts(Vec<Post>),
    PostAdded(Post),
    PostDeleted(PostId),
    SelectPost(Option<PostId>),
    PostLikeSet {
        post_id: PostId,
        user_id: UserId,
        liked: bool,
    },
    PostBookmarkSet {
        post_id: PostId,
        user_id: UserId,
        bookmarked: bool,
    },
    CommentAdded {
        post_id: PostId,
        comment: Comment,
    },
}

/// Which part of the state an action touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Session,
    SelectedUser,
    SuggestedUsers,
    Conversation(UserId),
    Compose,
    Presence,
    Notifications,
    Posts,
    SelectedPost,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub revision: u64,
    pub change: Change,
}

/// Single source of truth shared by the realtime task, services and views
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<AppState>>,
    revision: Arc<AtomicU64>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            revision: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    /// Apply `action` and notify subscribers if anything changed
    pub fn dispatch(&self, action: Action) -> Option<StoreEvent> {
        self.dispatch_if(action, || true)
    }

    /// Apply `action` only if `guard` holds while the write lock is taken.
    ///
    /// Revision and publication happen under the same guard, so subscribers
    /// see events in the order the state changed.
    pub fn dispatch_if(&self, action: Action, guard: impl FnOnce() -> bool) -> Option<StoreEvent> {
        let mut state = self.state.write();
        if !guard() {
            return None;
        }
        let change = reduce(&mut state, action)?;

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let event = StoreEvent { revision, change };
        // No receivers is fine; views subscribe lazily
        let _ = self.events.send(event.clone());
        Some(event)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Read a projection of the state without cloning all of it
    pub fn select<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> Option<Session> {
        self.select(|s| s.auth.session.clone())
    }

    pub fn session_user_id(&self) -> Option<UserId> {
        self.select(|s| s.auth.session.as_ref().map(|session| session.user_id.clone()))
    }
}

fn reduce(state: &mut AppState, action: Action) -> Option<Change> {
    match action {
        Action::SetSession(_)
        | Action::SelectUser(_)
        | Action::SetSuggestedUsers(_) => auth::reduce(&mut state.auth, action),

        Action::SessionEnded => {
            *state = AppState::default();
            Some(Change::Reset)
        }

        Action::MessageAppended(message) => {
            let local = state.auth.session.as_ref().map(|s| s.user_id.as_str());
            state.chat.append(local, message)
        }

        Action::ConversationLoaded { .. }
        | Action::SetCompose(_)
        | Action::ClearCompose
        | Action::PresenceReplaced(_)
        | Action::PresenceCleared => chat::reduce(&mut state.chat, action),

        Action::LikeNotificationReceived(_)
        | Action::NotificationsAcknowledged(_)
        | Action::NotificationsCleared => {
            notifications::reduce(&mut state.notifications, action)
        }

        Action::SetPosts(_)
        | Action::PostAdded(_)
        | Action::PostDeleted(_)
        | Action::SelectPost(_)
        | Action::PostLikeSet { .. }
        | Action::PostBookmarkSet { .. }
        | Action::CommentAdded { .. } => posts::reduce(&mut state.posts, action),
    }
}
