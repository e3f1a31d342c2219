//! 访问规则验证
//!
//! 纯谓词层，无副作用，每个修改操作执行前都必须先通过这里的检查。
//! 检查失败返回 `Unauthorized`，绝不静默跳过。

use crate::entities::{ConnectionRequest, Conversation, Message, UserProfile};
use crate::errors::{DomainError, DomainResult};

/// 消息核心访问规则
pub struct AccessGuard;

impl AccessGuard {
    /// 验证用户是否可以在会话中发送消息
    ///
    /// 参与者始终允许；平台管理员额外允许介入群聊。
    pub fn can_message(actor: &UserProfile, conversation: &Conversation) -> DomainResult<()> {
        if conversation.is_participant(actor.id) {
            return Ok(());
        }
        if conversation.is_group_chat && actor.is_admin() {
            return Ok(());
        }
        Err(DomainError::unauthorized("在会话中发送消息"))
    }

    /// 验证用户是否可以管理群组（改名、增删成员）
    pub fn can_moderate_group(
        actor: &UserProfile,
        conversation: &Conversation,
    ) -> DomainResult<()> {
        if !conversation.is_group_chat {
            return Err(DomainError::invalid_state("一对一会话不支持群组操作"));
        }
        if conversation.is_group_admin(actor.id) || actor.is_admin() {
            return Ok(());
        }
        Err(DomainError::unauthorized("管理群组"))
    }

    /// 验证客户是否可以发起教练连接请求
    pub fn can_request_trainer(actor: &UserProfile) -> DomainResult<()> {
        if !actor.is_customer() {
            return Err(DomainError::unauthorized("发起教练连接请求"));
        }
        if actor.has_trainer() {
            return Err(DomainError::AlreadyPaired);
        }
        Ok(())
    }

    /// 验证用户是否可以处理连接请求（仅被请求的教练本人）
    pub fn can_respond_to_request(
        actor: &UserProfile,
        request: &ConnectionRequest,
    ) -> DomainResult<()> {
        if actor.id != request.trainer {
            return Err(DomainError::unauthorized("处理连接请求"));
        }
        Ok(())
    }

    /// 验证用户是否可以删除消息（发送者本人或平台管理员）
    pub fn can_delete_message(actor: &UserProfile, message: &Message) -> DomainResult<()> {
        if actor.id == message.sender || actor.is_admin() {
            return Ok(());
        }
        Err(DomainError::unauthorized("删除消息"))
    }
}
