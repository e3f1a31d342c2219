//! 应用服务层
//!
//! 编排领域实体与Repository，实现关系建立、会话管理与
//! 消息收发的完整用例，并通过事件发布接口驱动实时推送。

pub mod errors;
pub mod publisher;
pub mod services;
pub mod stores;

pub use errors::{ApplicationError, ApplicationResult};
pub use publisher::{EventPublisher, NullEventPublisher, PublishError};
pub use services::{ConversationService, MessageService, RelationshipService};
pub use stores::{InMemoryChatStore, InMemoryConnectionRequestStore, InMemoryUserDirectory};
