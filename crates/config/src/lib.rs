//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务设置
//! - 实时会话设置

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// 实时会话配置
    pub realtime: RealtimeConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 实时会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// 单个用户允许的最大并发会话数
    pub max_sessions_per_user: usize,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无效的服务配置: {0}")]
    InvalidServerConfig(String),

    #[error("无效的实时配置: {0}")]
    InvalidRealtimeConfig(String),
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
            realtime: RealtimeConfig {
                max_sessions_per_user: env::var("REALTIME_MAX_SESSIONS_PER_USER")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "服务主机地址不能为空".to_string(),
            ));
        }
        if self.realtime.max_sessions_per_user == 0 {
            return Err(ConfigError::InvalidRealtimeConfig(
                "单用户最大会话数必须大于0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            realtime: RealtimeConfig {
                max_sessions_per_user: 5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.realtime.max_sessions_per_user, 5);
    }

    #[test]
    fn test_validate_rejects_zero_sessions() {
        let mut config = AppConfig::default();
        config.realtime.max_sessions_per_user = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRealtimeConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let mut config = AppConfig::default();
        config.server.host.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidServerConfig(_))
        ));
    }
}
