//! 内存存储实现
//!
//! 所有存储基于 `tokio::sync::RwLock` 保护的内存结构，
//! 满足Repository接口声明的原子性约束。

pub mod chat_store;
pub mod request_store;
pub mod user_directory;

pub use chat_store::InMemoryChatStore;
pub use request_store::InMemoryConnectionRequestStore;
pub use user_directory::InMemoryUserDirectory;
