//! 领域模型错误定义
//!
//! 定义了消息核心中所有可能的错误类型，提供清晰的错误上下文。

use thiserror::Error;

use crate::value_objects::UserId;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 权限错误
    #[error("权限不足: {action}")]
    Unauthorized { action: String },

    /// 状态机转换错误
    #[error("状态不合法: {detail}")]
    InvalidState { detail: String },

    /// 同一对(客户, 教练)已存在待处理的连接请求
    #[error("已存在待处理的连接请求")]
    DuplicateRequest,

    /// 客户已绑定教练
    #[error("客户已绑定教练")]
    AlreadyPaired,

    /// 用户已在群组中
    #[error("用户已在群组中: {user}")]
    AlreadyMember { user: UserId },

    /// 资源不存在错误
    #[error("资源不存在: {resource_type} ID {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// 消息内容为空
    #[error("消息内容为空")]
    EmptyContent,

    /// 群组初始成员不足
    #[error("群组成员不足: 提供 {given} 个, 至少需要 {required} 个")]
    TooFewMembers { given: usize, required: usize },

    /// 不允许将群主移出群组
    #[error("不能将群主移出群组")]
    CannotRemoveAdmin,

    /// 群主必须先转让群组才能退出（当前无转让操作，见设计文档）
    #[error("群主需先转让群组才能退出")]
    AdminMustTransferFirst,

    /// 客户当前没有绑定教练
    #[error("客户当前没有绑定教练")]
    NoTrainer,

    /// 验证错误
    #[error("验证失败: {field}: {message}")]
    ValidationError { field: String, message: String },
}

impl DomainError {
    /// 创建权限错误
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized {
            action: action.into(),
        }
    }

    /// 创建状态机转换错误
    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState {
            detail: detail.into(),
        }
    }

    /// 创建资源不存在错误
    pub fn resource_not_found(
        resource_type: impl Into<String>,
        resource_id: impl ToString,
    ) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            resource_id: resource_id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
