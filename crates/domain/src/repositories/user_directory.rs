//! 用户目录接口定义
//!
//! 用户目录是外部协作方，消息核心通过它查询角色与身份，
//! 并在连接请求被接受/解除时回写客户的教练绑定。

use async_trait::async_trait;

use crate::entities::UserProfile;
use crate::errors::DomainResult;
use crate::value_objects::UserId;

/// 用户目录接口
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 根据ID查找用户资料
    async fn find(&self, id: UserId) -> DomainResult<Option<UserProfile>>;

    /// 设置客户的教练绑定
    async fn set_trainer(&self, customer: UserId, trainer: UserId) -> DomainResult<()>;

    /// 清除客户的教练绑定
    async fn clear_trainer(&self, customer: UserId) -> DomainResult<()>;
}
