//! 事件发布接口
//!
//! 应用服务在状态变更提交后发布领域事件，由实时层负责
//! 按路由规则投递到在线会话。发布是尽力而为的：失败只
//! 记录日志，绝不回滚已提交的状态变更。

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use domain::events::ChatEvent;

/// 事件发布错误
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("事件发布失败: {0}")]
    Failed(String),
}

impl PublishError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// 事件发布接口
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 发布单个事件
    async fn publish(&self, event: ChatEvent) -> Result<(), PublishError>;
}

/// 空实现，用于测试或无实时推送的部署
pub struct NullEventPublisher;

#[async_trait]
impl EventPublisher for NullEventPublisher {
    async fn publish(&self, event: ChatEvent) -> Result<(), PublishError> {
        debug!(event_type = event.event_type(), "丢弃事件（空发布器）");
        Ok(())
    }
}
