//! 在线会话注册表
//!
//! 每个在线会话持有一条无界通道，注册时自动加入以用户ID为键的
//! 个人房间；会话级的会话房间成员关系是瞬态的，注销即清除。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use domain::events::ChatEvent;
use domain::value_objects::{ConversationId, UserId};

/// 在线会话唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 实时层错误
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("user {user} reached the session limit of {limit}")]
    SessionLimitReached { user: UserId, limit: usize },

    #[error("session {0} not found")]
    SessionNotFound(SessionId),
}

/// 单个在线会话的信息
#[derive(Debug, Clone)]
pub(crate) struct SessionInfo {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub sender: mpsc::UnboundedSender<ChatEvent>,
    pub connected_at: DateTime<Utc>,
}

/// 内存中的在线会话注册表
#[derive(Clone)]
pub struct SessionRegistry {
    /// 会话存储
    sessions: Arc<RwLock<HashMap<SessionId, SessionInfo>>>,
    /// 用户到会话的映射（个人房间）
    user_sessions: Arc<RwLock<HashMap<UserId, Vec<SessionId>>>>,
    /// 会话房间到在线会话的映射
    conversation_sessions: Arc<RwLock<HashMap<ConversationId, Vec<SessionId>>>>,
    /// 单用户最大并发会话数
    max_sessions_per_user: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions_per_user: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            user_sessions: Arc::new(RwLock::new(HashMap::new())),
            conversation_sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions_per_user,
        }
    }

    /// 注册在线会话，返回会话ID与事件接收端
    ///
    /// 会话自动加入用户的个人房间。
    pub async fn register(
        &self,
        user_id: UserId,
    ) -> Result<(SessionId, mpsc::UnboundedReceiver<ChatEvent>), RealtimeError> {
        let session_id = SessionId::new();
        let (sender, receiver) = mpsc::unbounded_channel();
        let info = SessionInfo {
            session_id,
            user_id,
            sender,
            connected_at: Utc::now(),
        };

        // 上限检查与写入持同一把写锁，并发注册不会超额
        // 锁顺序与 unregister 一致：先 sessions 后 user_sessions
        let mut sessions = self.sessions.write().await;
        let mut user_sessions = self.user_sessions.write().await;
        let current = user_sessions.get(&user_id).map(Vec::len).unwrap_or(0);
        if current >= self.max_sessions_per_user {
            return Err(RealtimeError::SessionLimitReached {
                user: user_id,
                limit: self.max_sessions_per_user,
            });
        }
        sessions.insert(session_id, info);
        user_sessions.entry(user_id).or_default().push(session_id);

        info!("session {} registered for user {}", session_id, user_id);
        Ok((session_id, receiver))
    }

    /// 注销在线会话，清除其全部房间成员关系
    pub async fn unregister(&self, session_id: SessionId) -> Result<(), RealtimeError> {
        let info = {
            let mut sessions = self.sessions.write().await;
            sessions
                .remove(&session_id)
                .ok_or(RealtimeError::SessionNotFound(session_id))?
        };

        {
            let mut user_sessions = self.user_sessions.write().await;
            if let Some(ids) = user_sessions.get_mut(&info.user_id) {
                ids.retain(|id| *id != session_id);
                if ids.is_empty() {
                    user_sessions.remove(&info.user_id);
                }
            }
        }
        {
            let mut conversation_sessions = self.conversation_sessions.write().await;
            for ids in conversation_sessions.values_mut() {
                ids.retain(|id| *id != session_id);
            }
            conversation_sessions.retain(|_, ids| !ids.is_empty());
        }

        info!("session {} unregistered for user {}", session_id, info.user_id);
        Ok(())
    }

    /// 会话加入会话房间
    pub async fn join_conversation(
        &self,
        session_id: SessionId,
        conversation_id: ConversationId,
    ) -> Result<(), RealtimeError> {
        {
            let sessions = self.sessions.read().await;
            if !sessions.contains_key(&session_id) {
                return Err(RealtimeError::SessionNotFound(session_id));
            }
        }

        let mut conversation_sessions = self.conversation_sessions.write().await;
        let ids = conversation_sessions.entry(conversation_id).or_default();
        if !ids.contains(&session_id) {
            ids.push(session_id);
        }
        debug!("session {} joined conversation {}", session_id, conversation_id);
        Ok(())
    }

    /// 会话离开会话房间
    pub async fn leave_conversation(
        &self,
        session_id: SessionId,
        conversation_id: ConversationId,
    ) -> Result<(), RealtimeError> {
        let mut conversation_sessions = self.conversation_sessions.write().await;
        if let Some(ids) = conversation_sessions.get_mut(&conversation_id) {
            ids.retain(|id| *id != session_id);
            if ids.is_empty() {
                conversation_sessions.remove(&conversation_id);
            }
        }
        debug!("session {} left conversation {}", session_id, conversation_id);
        Ok(())
    }

    /// 用户当前在线会话数
    pub async fn session_count(&self, user_id: UserId) -> usize {
        let user_sessions = self.user_sessions.read().await;
        user_sessions.get(&user_id).map(Vec::len).unwrap_or(0)
    }

    /// 个人房间的在线会话快照
    pub(crate) async fn sessions_for_user(&self, user_id: UserId) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let user_sessions = self.user_sessions.read().await;
        user_sessions
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| sessions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 会话房间的在线会话快照
    pub(crate) async fn sessions_for_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let conversation_sessions = self.conversation_sessions.read().await;
        conversation_sessions
            .get(&conversation_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| sessions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
