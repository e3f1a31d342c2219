//! 用户目录的内存实现

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::entities::UserProfile;
use domain::errors::{DomainError, DomainResult};
use domain::repositories::UserDirectory;
use domain::value_objects::UserId;

/// 用户目录的内存实现
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册或覆盖用户资料
    pub async fn upsert(&self, profile: UserProfile) {
        let mut users = self.users.write().await;
        users.insert(profile.id, profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find(&self, id: UserId) -> DomainResult<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn set_trainer(&self, customer: UserId, trainer: UserId) -> DomainResult<()> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(&customer)
            .ok_or_else(|| DomainError::resource_not_found("用户", customer))?;
        profile.trainer = Some(trainer);
        Ok(())
    }

    async fn clear_trainer(&self, customer: UserId) -> DomainResult<()> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(&customer)
            .ok_or_else(|| DomainError::resource_not_found("用户", customer))?;
        profile.trainer = None;
        Ok(())
    }
}
