//! 关系管理服务
//!
//! 编排客户与教练之间连接请求的完整生命周期：发起、处理、
//! 解绑，以及供评价等协作方使用的关系查询。

use std::sync::Arc;

use tracing::{info, warn};

use domain::access::AccessGuard;
use domain::entities::{ConnectionRequest, RequestDecision, UserProfile};
use domain::errors::DomainError;
use domain::events::ChatEvent;
use domain::repositories::{ConnectionRequestRepository, ConversationRepository, UserDirectory};
use domain::value_objects::{RequestId, UserId};

use crate::errors::ApplicationResult;
use crate::publisher::EventPublisher;

/// 关系管理服务
pub struct RelationshipService {
    requests: Arc<dyn ConnectionRequestRepository>,
    conversations: Arc<dyn ConversationRepository>,
    directory: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
}

impl RelationshipService {
    pub fn new(
        requests: Arc<dyn ConnectionRequestRepository>,
        conversations: Arc<dyn ConversationRepository>,
        directory: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            requests,
            conversations,
            directory,
            publisher,
        }
    }

    /// 客户向教练发起连接请求
    pub async fn request_connection(
        &self,
        customer_id: UserId,
        trainer_id: UserId,
        message: Option<String>,
    ) -> ApplicationResult<ConnectionRequest> {
        let customer = self.require_profile(customer_id).await?;
        AccessGuard::can_request_trainer(&customer)?;

        let trainer = self.require_profile(trainer_id).await?;
        if !trainer.is_trainer() {
            // 非教练身份的目标视作教练不存在
            return Err(DomainError::resource_not_found("教练", trainer_id).into());
        }

        let request = self
            .requests
            .create(ConnectionRequest::new(customer_id, trainer_id, message))
            .await?;

        info!(
            request_id = %request.id,
            customer_id = %customer_id,
            trainer_id = %trainer_id,
            "创建教练连接请求"
        );

        self.publish(ChatEvent::connection_request_created(request.clone()))
            .await;
        Ok(request)
    }

    /// 教练处理连接请求
    ///
    /// 接受后绑定客户的教练并确保一对一会话存在；拒绝无副作用。
    pub async fn respond_to_connection(
        &self,
        trainer_id: UserId,
        request_id: RequestId,
        decision: RequestDecision,
    ) -> ApplicationResult<ConnectionRequest> {
        let trainer = self.require_profile(trainer_id).await?;
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| DomainError::resource_not_found("连接请求", request_id))?;
        AccessGuard::can_respond_to_request(&trainer, &request)?;

        // 状态转换在存储写锁下原子完成，并发重复处理只有一个成功
        let request = self.requests.transition(request_id, decision).await?;

        if request.is_accepted() {
            self.directory
                .set_trainer(request.customer, request.trainer)
                .await?;
            self.conversations
                .create_or_get_direct(request.customer, request.trainer)
                .await?;
        }

        info!(
            request_id = %request.id,
            trainer_id = %trainer_id,
            decision = ?decision,
            "处理教练连接请求"
        );

        self.publish(ChatEvent::connection_request_responded(request.clone()))
            .await;
        Ok(request)
    }

    /// 客户解除教练绑定
    ///
    /// 仅清除绑定，请求历史与会话保持不变。
    pub async fn disconnect_trainer(&self, customer_id: UserId) -> ApplicationResult<()> {
        let customer = self.require_profile(customer_id).await?;
        if !customer.has_trainer() {
            return Err(DomainError::NoTrainer.into());
        }

        self.directory.clear_trainer(customer_id).await?;
        info!(customer_id = %customer_id, "解除教练绑定");
        Ok(())
    }

    /// 检查客户与教练之间是否存在有效关系
    ///
    /// 已接受的请求或当前目录绑定之一成立即为真。
    pub async fn has_trainer_relationship(
        &self,
        customer_id: UserId,
        trainer_id: UserId,
    ) -> ApplicationResult<bool> {
        if self
            .requests
            .has_accepted_pair(customer_id, trainer_id)
            .await?
        {
            return Ok(true);
        }

        let linked = self
            .directory
            .find(customer_id)
            .await?
            .map(|p| p.trainer == Some(trainer_id))
            .unwrap_or(false);
        Ok(linked)
    }

    /// 查询教练收到的全部请求，按创建时间倒序
    pub async fn list_requests_for_trainer(
        &self,
        trainer_id: UserId,
    ) -> ApplicationResult<Vec<ConnectionRequest>> {
        Ok(self.requests.find_by_trainer(trainer_id).await?)
    }

    /// 根据ID查询请求
    pub async fn find_request(
        &self,
        request_id: RequestId,
    ) -> ApplicationResult<Option<ConnectionRequest>> {
        Ok(self.requests.find_by_id(request_id).await?)
    }

    async fn require_profile(&self, id: UserId) -> ApplicationResult<UserProfile> {
        Ok(self
            .directory
            .find(id)
            .await?
            .ok_or_else(|| DomainError::resource_not_found("用户", id))?)
    }

    /// 事件发布尽力而为，失败只记录日志，不影响已提交的变更
    async fn publish(&self, event: ChatEvent) {
        if let Err(e) = self.publisher.publish(event).await {
            warn!(error = %e, "事件发布失败");
        }
    }
}
