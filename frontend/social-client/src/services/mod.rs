pub mod chat_service;
pub mod post_service;

pub use chat_service::ChatService;
pub use post_service::PostService;
