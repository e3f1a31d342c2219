//! 健身房会员平台消息核心领域模型
//!
//! 包含连接请求、会话、消息等核心实体，以及访问规则和领域事件。

pub mod access;
pub mod entities;
pub mod errors;
pub mod events;
pub mod repositories;
pub mod value_objects;

// 重新导出常用类型
pub use access::*;
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use repositories::*;
pub use value_objects::*;
