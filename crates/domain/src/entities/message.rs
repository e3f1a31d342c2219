//! 消息实体定义
//!
//! 追加写入的会话消息，`read_by` 集合只增不减。

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainResult;
use crate::value_objects::{ConversationId, MessageContent, MessageId, UserId};

/// 消息实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// 消息唯一ID
    pub id: MessageId,
    /// 所属会话
    pub conversation: ConversationId,
    /// 发送者
    pub sender: UserId,
    /// 消息内容
    pub content: MessageContent,
    /// 已读用户集合（发送者创建时即已读）
    pub read_by: HashSet<UserId>,
    /// 发送时间
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// 创建新消息
    pub fn new(
        conversation: ConversationId,
        sender: UserId,
        content: impl Into<String>,
    ) -> DomainResult<Self> {
        let content = MessageContent::new(content)?;

        Ok(Self {
            id: MessageId::new(),
            conversation,
            sender,
            content,
            read_by: HashSet::from([sender]),
            created_at: Utc::now(),
        })
    }

    /// 标记用户已读，返回是否新增
    pub fn mark_read_by(&mut self, user: UserId) -> bool {
        self.read_by.insert(user)
    }

    pub fn is_read_by(&self, user: UserId) -> bool {
        self.read_by.contains(&user)
    }

    /// 对指定用户是否属于未读消息（自己发送的消息不计未读）
    pub fn is_unread_for(&self, user: UserId) -> bool {
        self.sender != user && !self.read_by.contains(&user)
    }
}
