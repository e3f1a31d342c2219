//! 教练连接请求实体
//!
//! 客户向教练发起的连接请求，pending 状态只允许转换一次，
//! 转换后即为终态。请求永不删除，作为审计记录保留。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{RequestId, UserId};

/// 未填写说明时的默认请求附言
pub const DEFAULT_REQUEST_MESSAGE: &str = "请求与教练建立连接";

/// 连接请求状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// 待处理
    Pending,
    /// 已接受（终态）
    Accepted,
    /// 已拒绝（终态）
    Rejected,
}

/// 教练对请求的处理决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDecision {
    Accepted,
    Rejected,
}

/// 连接请求实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    /// 请求唯一ID
    pub id: RequestId,
    /// 发起请求的客户
    pub customer: UserId,
    /// 被请求的教练
    pub trainer: UserId,
    /// 请求附言
    pub message: String,
    /// 请求状态
    pub status: RequestStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 处理时间
    pub responded_at: Option<DateTime<Utc>>,
}

impl ConnectionRequest {
    /// 创建新的待处理请求
    pub fn new(customer: UserId, trainer: UserId, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REQUEST_MESSAGE.to_string());

        Self {
            id: RequestId::new(),
            customer,
            trainer,
            message,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    /// 执行 Pending → 终态 的一次性转换
    ///
    /// 对非 pending 请求的重复处理返回 `InvalidState`，不提供幂等语义。
    pub fn respond(&mut self, decision: RequestDecision) -> DomainResult<()> {
        if self.status != RequestStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "请求 {} 已处理, 当前状态 {:?}",
                self.id, self.status
            )));
        }

        self.status = match decision {
            RequestDecision::Accepted => RequestStatus::Accepted,
            RequestDecision::Rejected => RequestStatus::Rejected,
        };
        self.responded_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == RequestStatus::Accepted
    }
}
