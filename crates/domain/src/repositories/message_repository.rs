//! 消息Repository接口定义

use async_trait::async_trait;

use crate::entities::Message;
use crate::errors::DomainResult;
use crate::value_objects::{ConversationId, MessageId, UserId};

/// 消息Repository接口
///
/// 实现必须与会话存储共享一致性边界：`append` 与 `delete`
/// 需要原子地维护所属会话的最新消息指针。
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 追加消息并无条件推进会话的最新消息指针
    ///
    /// 同一会话上并发的追加必须串行化指针的读-改-写，
    /// 允许后提交者获胜，不允许指针回退为更早的消息。
    async fn append(&self, message: Message) -> DomainResult<Message>;

    /// 根据ID查找消息
    async fn find_by_id(&self, id: MessageId) -> DomainResult<Option<Message>>;

    /// 获取会话全部消息，按发送时间升序（同时刻按插入顺序）
    async fn find_by_conversation(
        &self,
        conversation: ConversationId,
    ) -> DomainResult<Vec<Message>>;

    /// 批量将会话中读者未读的消息标记为已读，返回新标记数量
    async fn mark_conversation_read(
        &self,
        conversation: ConversationId,
        reader: UserId,
    ) -> DomainResult<usize>;

    /// 统计用户在其参与的全部会话中的未读消息数
    async fn unread_count(&self, user: UserId) -> DomainResult<usize>;

    /// 删除消息
    ///
    /// 若被删消息是会话的最新消息，指针修复为剩余消息中最新的一条，
    /// 无剩余消息时置空。修复是确定性的，总是成功。
    async fn delete(&self, id: MessageId) -> DomainResult<()>;
}
