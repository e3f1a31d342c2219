//! 消息核心的领域事件
//!
//! 管理器完成变更后发布事件，由实时总线按目标房间分发给在线会话。
//! 打字指示为瞬态事件，不持久化。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{ConnectionRequest, Message};
use crate::value_objects::{ConversationId, UserId};

/// 消息核心领域事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// 新消息送达会话
    MessageReceived {
        conversation_id: ConversationId,
        message: Message,
    },

    /// 用户正在输入
    Typing {
        conversation_id: ConversationId,
        user_id: UserId,
    },

    /// 用户停止输入
    StopTyping {
        conversation_id: ConversationId,
        user_id: UserId,
    },

    /// 新的教练连接请求（通知教练）
    ConnectionRequestCreated {
        trainer_id: UserId,
        request: ConnectionRequest,
    },

    /// 连接请求已处理（通知客户）
    ConnectionRequestResponded {
        customer_id: UserId,
        request: ConnectionRequest,
    },

    /// 活动报名通知（通知组织者）
    EventRegistration {
        organizer_id: UserId,
        attendee_id: UserId,
        event_id: Uuid,
        event_name: String,
    },
}

impl ChatEvent {
    /// 创建新消息事件
    pub fn message_received(conversation_id: ConversationId, message: Message) -> Self {
        ChatEvent::MessageReceived {
            conversation_id,
            message,
        }
    }

    /// 创建打字指示事件
    pub fn typing(conversation_id: ConversationId, user_id: UserId) -> Self {
        ChatEvent::Typing {
            conversation_id,
            user_id,
        }
    }

    /// 创建停止打字事件
    pub fn stop_typing(conversation_id: ConversationId, user_id: UserId) -> Self {
        ChatEvent::StopTyping {
            conversation_id,
            user_id,
        }
    }

    /// 创建连接请求事件
    pub fn connection_request_created(request: ConnectionRequest) -> Self {
        ChatEvent::ConnectionRequestCreated {
            trainer_id: request.trainer,
            request,
        }
    }

    /// 创建请求已处理事件
    pub fn connection_request_responded(request: ConnectionRequest) -> Self {
        ChatEvent::ConnectionRequestResponded {
            customer_id: request.customer,
            request,
        }
    }

    /// 获取事件类型名称
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatEvent::MessageReceived { .. } => "MessageReceived",
            ChatEvent::Typing { .. } => "Typing",
            ChatEvent::StopTyping { .. } => "StopTyping",
            ChatEvent::ConnectionRequestCreated { .. } => "ConnectionRequestCreated",
            ChatEvent::ConnectionRequestResponded { .. } => "ConnectionRequestResponded",
            ChatEvent::EventRegistration { .. } => "EventRegistration",
        }
    }
}
