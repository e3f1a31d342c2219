//! 会话与消息的内存存储
//!
//! 会话和消息放在同一把锁下，`append` 推进最新消息指针、
//! `delete` 修复指针都在单个写临界区内完成，杜绝丢失更新。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::entities::{Conversation, Message};
use domain::errors::{DomainError, DomainResult};
use domain::repositories::{ConversationRepository, MessageRepository};
use domain::value_objects::{ConversationId, MessageId, UserId};

#[derive(Default)]
struct ChatStoreInner {
    conversations: HashMap<ConversationId, Conversation>,
    /// 一对一会话索引，键为排序后的参与者对
    direct_index: HashMap<(UserId, UserId), ConversationId>,
    messages: HashMap<MessageId, Message>,
    /// 每个会话的消息ID，按插入顺序
    conversation_messages: HashMap<ConversationId, Vec<MessageId>>,
}

/// 会话与消息的内存存储
#[derive(Clone, Default)]
pub struct InMemoryChatStore {
    inner: Arc<RwLock<ChatStoreInner>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryChatStore {
    async fn create_or_get_direct(&self, a: UserId, b: UserId) -> DomainResult<Conversation> {
        let mut inner = self.inner.write().await;
        let key = Conversation::direct_key(a, b);
        if let Some(id) = inner.direct_index.get(&key) {
            if let Some(existing) = inner.conversations.get(id) {
                return Ok(existing.clone());
            }
        }
        let conversation = Conversation::new_direct(a, b)?;
        inner.direct_index.insert(key, conversation.id);
        inner
            .conversation_messages
            .insert(conversation.id, Vec::new());
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn insert_group(&self, conversation: Conversation) -> DomainResult<Conversation> {
        let mut inner = self.inner.write().await;
        inner
            .conversation_messages
            .insert(conversation.id, Vec::new());
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn find_by_id(&self, id: ConversationId) -> DomainResult<Option<Conversation>> {
        let inner = self.inner.read().await;
        Ok(inner.conversations.get(&id).cloned())
    }

    async fn update(&self, conversation: &Conversation) -> DomainResult<Conversation> {
        let mut inner = self.inner.write().await;
        if !inner.conversations.contains_key(&conversation.id) {
            return Err(DomainError::resource_not_found("会话", conversation.id));
        }
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation.clone())
    }

    async fn find_for_user(&self, user: UserId) -> DomainResult<Vec<Conversation>> {
        let inner = self.inner.read().await;
        let mut result: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.is_participant(user))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[async_trait]
impl MessageRepository for InMemoryChatStore {
    async fn append(&self, message: Message) -> DomainResult<Message> {
        let mut inner = self.inner.write().await;
        if !inner.conversations.contains_key(&message.conversation) {
            return Err(DomainError::resource_not_found("会话", message.conversation));
        }
        inner
            .conversation_messages
            .entry(message.conversation)
            .or_default()
            .push(message.id);
        inner.messages.insert(message.id, message.clone());
        // 指针与消息在同一临界区内推进
        if let Some(conversation) = inner.conversations.get_mut(&message.conversation) {
            conversation.set_latest_message(Some(message.id));
        }
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> DomainResult<Option<Message>> {
        let inner = self.inner.read().await;
        Ok(inner.messages.get(&id).cloned())
    }

    async fn find_by_conversation(
        &self,
        conversation: ConversationId,
    ) -> DomainResult<Vec<Message>> {
        let inner = self.inner.read().await;
        let ids = inner
            .conversation_messages
            .get(&conversation)
            .cloned()
            .unwrap_or_default();
        let mut result: Vec<Message> = ids
            .iter()
            .filter_map(|id| inner.messages.get(id).cloned())
            .collect();
        // 稳定排序：同时刻保持插入顺序
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn mark_conversation_read(
        &self,
        conversation: ConversationId,
        reader: UserId,
    ) -> DomainResult<usize> {
        let mut inner = self.inner.write().await;
        let ids = inner
            .conversation_messages
            .get(&conversation)
            .cloned()
            .unwrap_or_default();
        let mut marked = 0;
        for id in ids {
            if let Some(message) = inner.messages.get_mut(&id) {
                if message.mark_read_by(reader) {
                    marked += 1;
                }
            }
        }
        Ok(marked)
    }

    async fn unread_count(&self, user: UserId) -> DomainResult<usize> {
        let inner = self.inner.read().await;
        let mut count = 0;
        for conversation in inner.conversations.values() {
            if !conversation.is_participant(user) {
                continue;
            }
            if let Some(ids) = inner.conversation_messages.get(&conversation.id) {
                count += ids
                    .iter()
                    .filter_map(|id| inner.messages.get(id))
                    .filter(|m| m.is_unread_for(user))
                    .count();
            }
        }
        Ok(count)
    }

    async fn delete(&self, id: MessageId) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        let message = inner
            .messages
            .remove(&id)
            .ok_or_else(|| DomainError::resource_not_found("消息", id))?;

        let remaining = {
            let ids = inner
                .conversation_messages
                .entry(message.conversation)
                .or_default();
            ids.retain(|mid| *mid != id);
            ids.clone()
        };

        let was_latest = inner
            .conversations
            .get(&message.conversation)
            .map(|c| c.latest_message == Some(id))
            .unwrap_or(false);

        // 被删的是最新消息时，指针修复为剩余消息中发送时间最晚的一条
        if was_latest {
            let latest = remaining
                .iter()
                .filter_map(|mid| inner.messages.get(mid))
                .max_by_key(|m| m.created_at)
                .map(|m| m.id);
            if let Some(conversation) = inner.conversations.get_mut(&message.conversation) {
                conversation.set_latest_message(latest);
            }
        }
        Ok(())
    }
}
