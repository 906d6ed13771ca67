pub mod message;
pub mod notification;
pub mod post;
pub mod user;

pub use message::{normalize_text, Conversation, Message};
pub use notification::{LikeNotification, NotificationId, NotificationKind};
pub use post::{Comment, ImageUpload, LikeAction, Post};
pub use user::{Session, UserSummary};

/// Backend object ids (Mongo ObjectId hex strings)
pub type UserId = String;
pub type MessageId = String;
pub type PostId = String;
