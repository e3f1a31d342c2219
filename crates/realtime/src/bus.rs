//! 实时事件总线
//!
//! 把领域事件路由到目标房间：消息与打字指示发往会话房间并排除
//! 触发者本人，请求类通知发往相关用户的个人房间。投递失败的
//! 会话视为已断开，从路由表中移除。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use application::publisher::{EventPublisher, PublishError};
use config::AppConfig;
use domain::events::ChatEvent;
use domain::value_objects::{ConversationId, UserId};

use crate::session::{SessionId, SessionRegistry};

/// 实时事件总线
#[derive(Clone)]
pub struct RealtimeBus {
    registry: Arc<SessionRegistry>,
}

impl RealtimeBus {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// 根据应用配置构建总线与注册表
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(SessionRegistry::new(
            config.realtime.max_sessions_per_user,
        )))
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    /// 投递事件到用户个人房间的全部在线会话
    pub async fn publish_to_user(&self, user_id: UserId, event: ChatEvent) {
        let sessions = self.registry.sessions_for_user(user_id).await;
        self.deliver(sessions.iter().map(|s| (s.session_id, &s.sender)), event)
            .await;
    }

    /// 投递事件到会话房间，可排除触发者本人的会话
    pub async fn publish_to_conversation(
        &self,
        conversation_id: ConversationId,
        event: ChatEvent,
        exclude: Option<UserId>,
    ) {
        let sessions = self.registry.sessions_for_conversation(conversation_id).await;
        let targets = sessions
            .iter()
            .filter(|s| exclude != Some(s.user_id))
            .map(|s| (s.session_id, &s.sender));
        self.deliver(targets, event).await;
    }

    /// 转发打字指示到会话房间（排除打字者，不持久化）
    pub async fn relay_typing(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
        typing: bool,
    ) {
        let event = if typing {
            ChatEvent::typing(conversation_id, user_id)
        } else {
            ChatEvent::stop_typing(conversation_id, user_id)
        };
        self.publish_to_conversation(conversation_id, event, Some(user_id))
            .await;
    }

    async fn deliver(
        &self,
        targets: impl Iterator<Item = (SessionId, &tokio::sync::mpsc::UnboundedSender<ChatEvent>)>,
        event: ChatEvent,
    ) {
        let mut closed = Vec::new();
        let mut delivered = 0usize;
        for (session_id, sender) in targets {
            if sender.send(event.clone()).is_err() {
                closed.push(session_id);
            } else {
                delivered += 1;
            }
        }

        debug!(
            event_type = event.event_type(),
            delivered, "event fanned out"
        );

        // 通道已关闭的会话视为断开，移出路由表
        for session_id in closed {
            warn!("session {} channel closed, dropping from routing", session_id);
            let _ = self.registry.unregister(session_id).await;
        }
    }
}

#[async_trait]
impl EventPublisher for RealtimeBus {
    async fn publish(&self, event: ChatEvent) -> Result<(), PublishError> {
        match &event {
            ChatEvent::MessageReceived {
                conversation_id,
                message,
            } => {
                let conversation_id = *conversation_id;
                let sender = message.sender;
                self.publish_to_conversation(conversation_id, event, Some(sender))
                    .await;
            }
            ChatEvent::Typing {
                conversation_id,
                user_id,
            }
            | ChatEvent::StopTyping {
                conversation_id,
                user_id,
            } => {
                let (conversation_id, user_id) = (*conversation_id, *user_id);
                self.publish_to_conversation(conversation_id, event, Some(user_id))
                    .await;
            }
            ChatEvent::ConnectionRequestCreated { trainer_id, .. } => {
                let trainer_id = *trainer_id;
                self.publish_to_user(trainer_id, event).await;
            }
            ChatEvent::ConnectionRequestResponded { customer_id, .. } => {
                let customer_id = *customer_id;
                self.publish_to_user(customer_id, event).await;
            }
            ChatEvent::EventRegistration { organizer_id, .. } => {
                let organizer_id = *organizer_id;
                self.publish_to_user(organizer_id, event).await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::entities::{ConnectionRequest, Message};

    fn bus(max_sessions: usize) -> RealtimeBus {
        RealtimeBus::new(Arc::new(SessionRegistry::new(max_sessions)))
    }

    #[tokio::test]
    async fn test_message_fanout_excludes_sender() {
        let bus = bus(5);
        let registry = bus.registry();
        let sender = UserId::new();
        let receiver = UserId::new();
        let conversation = ConversationId::new();

        let (s1, mut rx_sender) = registry.register(sender).await.unwrap();
        let (s2, mut rx_receiver) = registry.register(receiver).await.unwrap();
        registry.join_conversation(s1, conversation).await.unwrap();
        registry.join_conversation(s2, conversation).await.unwrap();

        let message = Message::new(conversation, sender, "你好").unwrap();
        bus.publish(ChatEvent::message_received(conversation, message))
            .await
            .unwrap();

        let event = rx_receiver.try_recv().unwrap();
        assert_eq!(event.event_type(), "MessageReceived");
        // 发送者自己的会话不收
        assert!(rx_sender.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_personal_room_notification() {
        let bus = bus(5);
        let registry = bus.registry();
        let customer = UserId::new();
        let trainer = UserId::new();

        let (_s, mut rx_trainer) = registry.register(trainer).await.unwrap();
        let (_s, mut rx_customer) = registry.register(customer).await.unwrap();

        let request = ConnectionRequest::new(customer, trainer, None);
        bus.publish(ChatEvent::connection_request_created(request.clone()))
            .await
            .unwrap();
        assert_eq!(
            rx_trainer.try_recv().unwrap().event_type(),
            "ConnectionRequestCreated"
        );
        assert!(rx_customer.try_recv().is_err());

        let mut request = request;
        request
            .respond(domain::entities::RequestDecision::Accepted)
            .unwrap();
        bus.publish(ChatEvent::connection_request_responded(request))
            .await
            .unwrap();
        assert_eq!(
            rx_customer.try_recv().unwrap().event_type(),
            "ConnectionRequestResponded"
        );
    }

    #[tokio::test]
    async fn test_typing_relay() {
        let bus = bus(5);
        let registry = bus.registry();
        let typist = UserId::new();
        let other = UserId::new();
        let conversation = ConversationId::new();

        let (s1, mut rx_typist) = registry.register(typist).await.unwrap();
        let (s2, mut rx_other) = registry.register(other).await.unwrap();
        registry.join_conversation(s1, conversation).await.unwrap();
        registry.join_conversation(s2, conversation).await.unwrap();

        bus.relay_typing(typist, conversation, true).await;
        assert_eq!(rx_other.try_recv().unwrap().event_type(), "Typing");
        assert!(rx_typist.try_recv().is_err());

        bus.relay_typing(typist, conversation, false).await;
        assert_eq!(rx_other.try_recv().unwrap().event_type(), "StopTyping");
    }

    #[tokio::test]
    async fn test_unregistered_session_receives_nothing() {
        let bus = bus(5);
        let registry = bus.registry();
        let user = UserId::new();
        let conversation = ConversationId::new();

        let (session_id, mut rx) = registry.register(user).await.unwrap();
        registry
            .join_conversation(session_id, conversation)
            .await
            .unwrap();
        registry.unregister(session_id).await.unwrap();

        bus.publish_to_conversation(
            conversation,
            ChatEvent::typing(conversation, UserId::new()),
            None,
        )
        .await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_channel_drops_session_from_routing() {
        let bus = bus(5);
        let registry = bus.registry();
        let user = UserId::new();

        let (_session_id, rx) = registry.register(user).await.unwrap();
        drop(rx);

        bus.publish_to_user(user, ChatEvent::typing(ConversationId::new(), user))
            .await;
        assert_eq!(registry.session_count(user).await, 0);
    }

    #[tokio::test]
    async fn test_event_registration_notifies_organizer() {
        let bus = bus(5);
        let registry = bus.registry();
        let organizer = UserId::new();
        let attendee = UserId::new();

        let (_s, mut rx) = registry.register(organizer).await.unwrap();
        bus.publish(ChatEvent::EventRegistration {
            organizer_id: organizer,
            attendee_id: attendee,
            event_id: uuid::Uuid::new_v4(),
            event_name: "晨间瑜伽".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(rx.try_recv().unwrap().event_type(), "EventRegistration");
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = AppConfig::default();
        let bus = RealtimeBus::from_config(&config);
        let user = UserId::new();
        let mut receivers = Vec::new();
        for _ in 0..config.realtime.max_sessions_per_user {
            let (_s, rx) = bus.registry().register(user).await.unwrap();
            receivers.push(rx);
        }
        assert!(bus.registry().register(user).await.is_err());
    }
}
