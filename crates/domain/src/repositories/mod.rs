//! Repository 与外部协作方接口定义

pub mod connection_request_repository;
pub mod conversation_repository;
pub mod message_repository;
pub mod user_directory;

pub use connection_request_repository::ConnectionRequestRepository;
pub use conversation_repository::ConversationRepository;
pub use message_repository::MessageRepository;
pub use user_directory::UserDirectory;
