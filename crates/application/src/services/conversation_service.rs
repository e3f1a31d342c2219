//! 会话目录服务
//!
//! 管理一对一会话与群聊：按无序参与者对去重直连会话，
//! 群聊的名称与成员变更统一经过群组管理权限检查。

use std::sync::Arc;

use tracing::info;

use domain::access::AccessGuard;
use domain::entities::{Conversation, UserProfile};
use domain::errors::DomainError;
use domain::repositories::{ConversationRepository, UserDirectory};
use domain::value_objects::{ConversationId, GroupName, UserId};

use crate::errors::ApplicationResult;

/// 会话目录服务
pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    directory: Arc<dyn UserDirectory>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            conversations,
            directory,
        }
    }

    /// 查找或创建一对一会话
    pub async fn create_or_get_direct(
        &self,
        a: UserId,
        b: UserId,
    ) -> ApplicationResult<Conversation> {
        self.require_profile(a).await?;
        self.require_profile(b).await?;
        let conversation = self.conversations.create_or_get_direct(a, b).await?;
        Ok(conversation)
    }

    /// 创建群聊，创建者自动加入并成为群主
    pub async fn create_group(
        &self,
        creator: UserId,
        name: &str,
        initial_participants: &[UserId],
    ) -> ApplicationResult<Conversation> {
        self.require_profile(creator).await?;
        let name = GroupName::parse(name)?;
        let conversation = Conversation::new_group(creator, name, initial_participants)?;
        let conversation = self.conversations.insert_group(conversation).await?;

        info!(
            conversation_id = %conversation.id,
            creator = %creator,
            participants = conversation.participants.len(),
            "创建群聊"
        );
        Ok(conversation)
    }

    /// 重命名群组
    pub async fn rename_group(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
        name: &str,
    ) -> ApplicationResult<Conversation> {
        let (profile, mut conversation) = self.load(actor, conversation_id).await?;
        AccessGuard::can_moderate_group(&profile, &conversation)?;

        conversation.rename(GroupName::parse(name)?)?;
        let conversation = self.conversations.update(&conversation).await?;
        info!(conversation_id = %conversation_id, actor = %actor, "重命名群组");
        Ok(conversation)
    }

    /// 添加群组成员
    pub async fn add_member(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ApplicationResult<Conversation> {
        let (profile, mut conversation) = self.load(actor, conversation_id).await?;
        AccessGuard::can_moderate_group(&profile, &conversation)?;
        self.require_profile(user_id).await?;

        conversation.add_participant(user_id)?;
        let conversation = self.conversations.update(&conversation).await?;
        info!(conversation_id = %conversation_id, user_id = %user_id, "添加群组成员");
        Ok(conversation)
    }

    /// 移除群组成员（群主不可被移除）
    pub async fn remove_member(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ApplicationResult<Conversation> {
        let (profile, mut conversation) = self.load(actor, conversation_id).await?;
        AccessGuard::can_moderate_group(&profile, &conversation)?;

        conversation.remove_participant(user_id)?;
        let conversation = self.conversations.update(&conversation).await?;
        info!(conversation_id = %conversation_id, user_id = %user_id, "移除群组成员");
        Ok(conversation)
    }

    /// 成员主动退出群组（群主需先转让）
    pub async fn leave(
        &self,
        actor: UserId,
        conversation_id: ConversationId,
    ) -> ApplicationResult<Conversation> {
        let (_, mut conversation) = self.load(actor, conversation_id).await?;

        conversation.leave(actor)?;
        let conversation = self.conversations.update(&conversation).await?;
        info!(conversation_id = %conversation_id, actor = %actor, "退出群组");
        Ok(conversation)
    }

    /// 查询用户参与的全部会话，按创建时间倒序
    pub async fn list_for_user(&self, user_id: UserId) -> ApplicationResult<Vec<Conversation>> {
        Ok(self.conversations.find_for_user(user_id).await?)
    }

    /// 根据ID查询会话
    pub async fn find(
        &self,
        conversation_id: ConversationId,
    ) -> ApplicationResult<Option<Conversation>> {
        Ok(self.conversations.find_by_id(conversation_id).await?)
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
}
