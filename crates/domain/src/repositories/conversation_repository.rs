//! 会话Repository接口定义

use async_trait::async_trait;

use crate::entities::Conversation;
use crate::errors::DomainResult;
use crate::value_objects::{ConversationId, UserId};

/// 会话Repository接口
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// 查找或创建一对一会话
    ///
    /// 按无序参与者对去重；并发调用必须原子地返回同一个会话，
    /// 绝不产生重复的一对一线程。
    async fn create_or_get_direct(&self, a: UserId, b: UserId) -> DomainResult<Conversation>;

    /// 持久化新群聊
    async fn insert_group(&self, conversation: Conversation) -> DomainResult<Conversation>;

    /// 根据ID查找会话
    async fn find_by_id(&self, id: ConversationId) -> DomainResult<Option<Conversation>>;

    /// 整体更新会话（群组成员/名称变更）
    async fn update(&self, conversation: &Conversation) -> DomainResult<Conversation>;

    /// 获取用户参与的全部会话，按创建时间倒序
    async fn find_for_user(&self, user: UserId) -> DomainResult<Vec<Conversation>>;
}
