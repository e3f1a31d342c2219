//! 消息服务
//!
//! 消息发送、历史读取、批量已读与删除。发送与删除对
//! `latest_message` 指针的维护由存储层在单个写临界区内保证。

use std::sync::Arc;

use tracing::{info, warn};

use domain::access::AccessGuard;
use domain::entities::{Conversation, Message, UserProfile};
use domain::errors::DomainError;
use domain::events::ChatEvent;
use domain::repositories::{ConversationRepository, MessageRepository, UserDirectory};
use domain::value_objects::{ConversationId, MessageId, UserId};

use crate::errors::ApplicationResult;
use crate::publisher::EventPublisher;

/// 消息服务
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    directory: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        conversations: Arc<dyn ConversationRepository>,
        directory: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            messages,
            conversations,
            directory,
            publisher,
        }
    }

    /// 在会话中发送消息
    ///
    /// 发送者创建时即已读；消息写入与最新消息指针推进原子完成。
    pub async fn send_message(
        &self,
        sender: UserId,
        conversation_id: ConversationId,
        content: &str,
    ) -> ApplicationResult<Message> {
        let (profile, conversation) = self.load(sender, conversation_id).await?;
        AccessGuard::can_message(&profile, &conversation)?;

        let message = Message::new(conversation_id, sender, content)?;
        let message = self.messages.append(message).await?;

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sender = %sender,
            "发送消息"
        );

        self.publish(ChatEvent::message_received(conversation_id, message.clone()))
            .await;
        Ok(message)
    }

    /// 读取会话历史，按发送时间升序
    ///
    /// 读取即已读：返回前批量标记读者的全部未读消息。
    /// 历史读取要求严格的成员身份，管理员介入仅限发送。
    pub async fn fetch_messages(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
    ) -> ApplicationResult<Vec<Message>> {
        let (_, conversation) = self.load(actor, conversation_id).await?;
        if !conversation.is_participant(actor) {
            return Err(DomainError::unauthorized("读取会话历史").into());
        }

        self.messages
            .mark_conversation_read(conversation_id, actor)
            .await?;
        Ok(self.messages.find_by_conversation(conversation_id).await?)
    }

    /// 批量标记会话已读，返回新标记数量
    pub async fn mark_read(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
    ) -> ApplicationResult<usize> {
        let (_, conversation) = self.load(actor, conversation_id).await?;
        if !conversation.is_participant(actor) {
            return Err(DomainError::unauthorized("标记会话已读").into());
        }

        let marked = self
            .messages
            .mark_conversation_read(conversation_id, actor)
            .await?;
        Ok(marked)
    }

    /// 统计用户在其参与的全部会话中的未读消息数
    pub async fn unread_count(&self, actor: UserId) -> ApplicationResult<usize> {
        self.require_profile(actor).await?;
        Ok(self.messages.unread_count(actor).await?)
    }

    /// 删除消息（发送者本人或平台管理员）
    ///
    /// 被删的是最新消息时指针自动修复。
    pub async fn delete_message(
        &self,
        actor: UserId,
        message_id: MessageId,
    ) -> ApplicationResult<()> {
        let profile = self.require_profile(actor).await?;
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::resource_not_found("消息", message_id))?;
        AccessGuard::can_delete_message(&profile, &message)?;

        self.messages.delete(message_id).await?;
        info!(
            message_id = %message_id,
            actor = %actor,
            conversation_id = %message.conversation,
            "删除消息"
        );
        Ok(())
    }

    async fn load(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
    ) -> ApplicationResult<(UserProfile, Conversation)> {
        let profile = self.require_profile(actor).await?;
        let conversation = self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| DomainError::resource_not_found("会话", conversation_id))?;
        Ok((profile, conversation))
    }

    async fn require_profile(&self, id: UserId) -> ApplicationResult<UserProfile> {
        Ok(self
            .directory
            .find(id)
            .await?
            .ok_or_else(|| DomainError::resource_not_found("用户", id))?)
    }

    async fn publish(&self, event: ChatEvent) {
        if let Err(e) = self.publisher.publish(event).await {
            warn!(error = %e, "事件发布失败");
        }
    }
}
