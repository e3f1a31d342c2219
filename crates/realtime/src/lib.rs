//! 实时推送层
//!
//! 维护在线会话注册表与房间成员关系，把领域事件按路由规则
//! 分发到目标用户的活跃会话。投递为尽力而为，离线会话不补发。

pub mod bus;
pub mod session;

pub use bus::RealtimeBus;
pub use session::{RealtimeError, SessionId, SessionRegistry};
