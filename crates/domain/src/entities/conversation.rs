//! 会话实体定义
//!
//! 区分一对一会话与群聊：一对一会话按无序参与者对唯一，
//! 群聊由群主管理成员。`latest_message` 指针用于列表预览。

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ConversationId, GroupName, MessageId, UserId};

/// 会话实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// 会话唯一ID
    pub id: ConversationId,
    /// 参与者集合
    pub participants: HashSet<UserId>,
    /// 是否为群聊
    pub is_group_chat: bool,
    /// 群组名称（仅群聊）
    pub group_name: Option<GroupName>,
    /// 群主（仅群聊，必须是参与者）
    pub group_admin: Option<UserId>,
    /// 最新消息指针
    pub latest_message: Option<MessageId>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// 创建一对一会话
    pub fn new_direct(a: UserId, b: UserId) -> DomainResult<Self> {
        if a == b {
            return Err(DomainError::validation_error(
                "participants",
                "不能与自己建立会话",
            ));
        }

        Ok(Self {
            id: ConversationId::new(),
            participants: HashSet::from([a, b]),
            is_group_chat: false,
            group_name: None,
            group_admin: None,
            latest_message: None,
            created_at: Utc::now(),
        })
    }

    /// 创建群聊
    ///
    /// 初始成员不含创建者时至少需要2人，创建者自动加入并成为群主。
    pub fn new_group(
        admin: UserId,
        name: GroupName,
        initial_participants: &[UserId],
    ) -> DomainResult<Self> {
        let others: HashSet<UserId> = initial_participants
            .iter()
            .copied()
            .filter(|id| *id != admin)
            .collect();
        if others.len() < 2 {
            return Err(DomainError::TooFewMembers {
                given: others.len(),
                required: 2,
            });
        }

        let mut participants = others;
        participants.insert(admin);

        Ok(Self {
            id: ConversationId::new(),
            participants,
            is_group_chat: true,
            group_name: Some(name),
            group_admin: Some(admin),
            latest_message: None,
            created_at: Utc::now(),
        })
    }

    /// 一对一会话去重使用的无序参与者键
    pub fn direct_key(a: UserId, b: UserId) -> (UserId, UserId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    pub fn is_group_admin(&self, user: UserId) -> bool {
        self.group_admin == Some(user)
    }

    /// 更新群组名称
    pub fn rename(&mut self, name: GroupName) -> DomainResult<()> {
        self.ensure_group()?;
        self.group_name = Some(name);
        Ok(())
    }

    /// 添加群组成员
    pub fn add_participant(&mut self, user: UserId) -> DomainResult<()> {
        self.ensure_group()?;
        if !self.participants.insert(user) {
            return Err(DomainError::AlreadyMember { user });
        }
        Ok(())
    }

    /// 移除群组成员
    ///
    /// 群主不可被移除，需先转让（当前无转让操作，见设计文档）。
    pub fn remove_participant(&mut self, user: UserId) -> DomainResult<()> {
        self.ensure_group()?;
        if self.is_group_admin(user) {
            return Err(DomainError::CannotRemoveAdmin);
        }
        if !self.participants.remove(&user) {
            return Err(DomainError::resource_not_found("群组成员", user));
        }
        Ok(())
    }

    /// 成员主动退出群组
    pub fn leave(&mut self, user: UserId) -> DomainResult<()> {
        self.ensure_group()?;
        if self.is_group_admin(user) {
            return Err(DomainError::AdminMustTransferFirst);
        }
        // 非成员与 remove_participant 一致，按资源不存在处理
        if !self.participants.remove(&user) {
            return Err(DomainError::resource_not_found("群组成员", user));
        }
        Ok(())
    }

    /// 更新最新消息指针
    pub fn set_latest_message(&mut self, message_id: Option<MessageId>) {
        self.latest_message = message_id;
    }

    fn ensure_group(&self) -> DomainResult<()> {
        if !self.is_group_chat {
            return Err(DomainError::invalid_state("一对一会话不支持群组操作"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_conversation_creation() {
        let a = UserId::new();
        let b = UserId::new();
        let conv = Conversation::new_direct(a, b).unwrap();

        assert!(!conv.is_group_chat);
        assert_eq!(conv.participants.len(), 2);
        assert!(conv.is_participant(a));
        assert!(conv.is_participant(b));
        assert!(conv.group_admin.is_none());
        assert!(conv.latest_message.is_none());

        assert!(Conversation::new_direct(a, a).is_err());
    }

    #[test]
    fn test_direct_key_is_unordered() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(Conversation::direct_key(a, b), Conversation::direct_key(b, a));
    }

    #[test]
    fn test_group_creation() {
        let admin = UserId::new();
        let u1 = UserId::new();
        let u2 = UserId::new();
        let name = GroupName::parse("晨练小组").unwrap();

        let conv = Conversation::new_group(admin, name.clone(), &[u1, u2]).unwrap();
        assert!(conv.is_group_chat);
        assert_eq!(conv.participants.len(), 3);
        assert!(conv.is_group_admin(admin));
        assert!(conv.is_participant(admin));

        // 初始成员不足
        let err = Conversation::new_group(admin, name.clone(), &[u1]).unwrap_err();
        assert!(matches!(err, DomainError::TooFewMembers { given: 1, required: 2 }));

        // 创建者出现在初始成员中不计入人数
        let err = Conversation::new_group(admin, name, &[admin, u1]).unwrap_err();
        assert!(matches!(err, DomainError::TooFewMembers { .. }));
    }

    #[test]
    fn test_group_membership_management() {
        let admin = UserId::new();
        let u1 = UserId::new();
        let u2 = UserId::new();
        let u3 = UserId::new();
        let name = GroupName::parse("小组").unwrap();
        let mut conv = Conversation::new_group(admin, name, &[u1, u2]).unwrap();

        conv.add_participant(u3).unwrap();
        assert!(conv.is_participant(u3));
        assert_eq!(
            conv.add_participant(u3),
            Err(DomainError::AlreadyMember { user: u3 })
        );

        conv.remove_participant(u3).unwrap();
        assert!(!conv.is_participant(u3));
        assert_eq!(
            conv.remove_participant(admin),
            Err(DomainError::CannotRemoveAdmin)
        );

        conv.leave(u2).unwrap();
        assert!(!conv.is_participant(u2));
        assert_eq!(conv.leave(admin), Err(DomainError::AdminMustTransferFirst));

        // 非成员退出与非成员移除返回同一错误类型
        assert!(matches!(
            conv.leave(u2),
            Err(DomainError::ResourceNotFound { .. })
        ));
        assert!(matches!(
            conv.remove_participant(u2),
            Err(DomainError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_group_operations_rejected_on_direct() {
        let a = UserId::new();
        let b = UserId::new();
        let mut conv = Conversation::new_direct(a, b).unwrap();

        assert!(conv.add_participant(UserId::new()).is_err());
        assert!(conv.remove_participant(b).is_err());
        assert!(conv.leave(a).is_err());
        assert!(conv.rename(GroupName::parse("x").unwrap()).is_err());
    }

    #[test]
    fn test_conversation_serialization() {
        let conv = Conversation::new_direct(UserId::new(), UserId::new()).unwrap();
        let json = serde_json::to_string(&conv).unwrap();
        let deserialized: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(conv, deserialized);
    }
}
