//! Realtime channel
//!
//! - [`ConnectionManager`]: one socket per session, reconnect with backoff
//! - [`EventDispatcher`]: frame decoding and store actions
//! - [`PresenceSet`] / [`PresenceHub`]: online users and their subscribers

pub mod connection;
pub mod dispatcher;
pub mod presence;

pub use connection::{ConnectionManager, ConnectionSettings, ConnectionState};
pub use dispatcher::EventDispatcher;
pub use presence::{PresenceHandler, PresenceHub, PresenceSet};
