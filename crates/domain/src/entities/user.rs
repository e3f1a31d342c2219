//! 用户目录读取模型
//!
//! 用户由外部的用户目录拥有，消息核心只消费其只读投影。

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 用户角色枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 管理员
    Admin,
    /// 教练
    Trainer,
    /// 客户
    Customer,
    /// 前台
    Receptionist,
}

/// 用户资料投影
///
/// 不变式：一个客户同一时间最多绑定一位教练。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// 用户唯一ID
    pub id: UserId,
    /// 显示名称
    pub full_name: String,
    /// 用户角色
    pub role: UserRole,
    /// 客户绑定的教练（仅客户使用）
    pub trainer: Option<UserId>,
}

impl UserProfile {
    pub fn new(id: UserId, full_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            role,
            trainer: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_trainer(&self) -> bool {
        self.role == UserRole::Trainer
    }

    pub fn is_customer(&self) -> bool {
        self.role == UserRole::Customer
    }

    /// 检查客户是否已绑定教练
    pub fn has_trainer(&self) -> bool {
        self.trainer.is_some()
    }
}
