//! 连接请求的内存存储
//!
//! 重复检查与状态转换都在写锁下完成：同一对(客户, 教练)的
//! 并发提交只能产生一条待处理请求，并发响应只有一个成功。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::entities::{ConnectionRequest, RequestDecision};
use domain::errors::{DomainError, DomainResult};
use domain::repositories::ConnectionRequestRepository;
use domain::value_objects::{RequestId, UserId};

/// 连接请求的内存存储
#[derive(Clone, Default)]
pub struct InMemoryConnectionRequestStore {
    requests: Arc<RwLock<HashMap<RequestId, ConnectionRequest>>>,
}

impl InMemoryConnectionRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRequestRepository for InMemoryConnectionRequestStore {
    async fn create(&self, request: ConnectionRequest) -> DomainResult<ConnectionRequest> {
        let mut requests = self.requests.write().await;
        let duplicate = requests.values().any(|r| {
            r.customer == request.customer && r.trainer == request.trainer && r.is_pending()
        });
        if duplicate {
            return Err(DomainError::DuplicateRequest);
        }
        requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: RequestId) -> DomainResult<Option<ConnectionRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: RequestId,
        decision: RequestDecision,
    ) -> DomainResult<ConnectionRequest> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| DomainError::resource_not_found("连接请求", id))?;
        request.respond(decision)?;
        Ok(request.clone())
    }

    async fn find_by_trainer(&self, trainer: UserId) -> DomainResult<Vec<ConnectionRequest>> {
        let requests = self.requests.read().await;
        let mut result: Vec<ConnectionRequest> = requests
            .values()
            .filter(|r| r.trainer == trainer)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn has_accepted_pair(&self, customer: UserId, trainer: UserId) -> DomainResult<bool> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .any(|r| r.customer == customer && r.trainer == trainer && r.is_accepted()))
    }
}
