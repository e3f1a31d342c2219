//! 连接请求Repository接口定义

use async_trait::async_trait;

use crate::entities::{ConnectionRequest, RequestDecision};
use crate::errors::DomainResult;
use crate::value_objects::{RequestId, UserId};

/// 连接请求Repository接口
///
/// 请求永不删除，作为审计记录保留。
#[async_trait]
pub trait ConnectionRequestRepository: Send + Sync {
    /// 持久化新请求
    ///
    /// 同一对(客户, 教练)已存在待处理请求时必须原子地拒绝并返回
    /// `DuplicateRequest`。
    async fn create(&self, request: ConnectionRequest) -> DomainResult<ConnectionRequest>;

    /// 根据ID查找请求
    async fn find_by_id(&self, id: RequestId) -> DomainResult<Option<ConnectionRequest>>;

    /// 原子地执行 Pending → 终态 的状态转换
    ///
    /// 并发的重复提交中只有一个成功，其余观察到 `InvalidState`。
    async fn transition(
        &self,
        id: RequestId,
        decision: RequestDecision,
    ) -> DomainResult<ConnectionRequest>;

    /// 获取教练收到的全部请求，按创建时间倒序
    async fn find_by_trainer(&self, trainer: UserId) -> DomainResult<Vec<ConnectionRequest>>;

    /// 检查一对(客户, 教练)是否存在已接受的请求
    async fn has_accepted_pair(&self, customer: UserId, trainer: UserId) -> DomainResult<bool>;
}
