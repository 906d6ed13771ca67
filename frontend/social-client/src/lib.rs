//! Client core for the social app: direct messages, presence and like
//! notifications kept in sync with the backend's REST API and realtime channel.
//!
//! ```no_run
//! use social_client::{Config, Session, SocialClient};
//!
//! # async fn run() -> social_client::Result<()> {
//! let config = Config::load()?;
//! let client = SocialClient::new(&config)?;
//! client.begin_session(Session {
//!     user_id: "u1".into(),
//!     username: "alice".into(),
//!     profile_picture: None,
//! })?;
//!
//! client.chat().send_message("u2", "hi").await?;
//! client.end_session();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod realtime;
pub mod services;
pub mod store;

pub use client::SocialClient;
pub use config::Config;
pub use error::{ClientError, Result};
pub use models::{Message, Session};
