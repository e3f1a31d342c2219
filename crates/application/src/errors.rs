//! 应用层错误定义

use domain::errors::DomainError;
use thiserror::Error;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 领域错误
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 基础设施错误
    #[error("基础设施错误: {0}")]
    Infrastructure(String),
}

impl ApplicationError {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure(message.into())
    }

    /// 判断是否为资源不存在错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::ResourceNotFound { .. }))
    }
}

/// 应用层结果类型
pub type ApplicationResult<T> = Result<T, ApplicationError>;
