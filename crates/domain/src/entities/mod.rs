//! 核心实体定义

pub mod connection_request;
pub mod conversation;
pub mod message;
pub mod user;

pub use connection_request::{ConnectionRequest, RequestDecision, RequestStatus};
pub use conversation::Conversation;
pub use message::Message;
pub use user::{UserProfile, UserRole};
