//! 并发数据一致性测试
//!
//! 验证并发场景下连接请求去重、请求处理单次生效、
//! 一对一会话去重以及最新消息指针的正确性。

use std::sync::Arc;

use application::{
    ConversationService, InMemoryChatStore, InMemoryConnectionRequestStore, InMemoryUserDirectory,
    MessageService, NullEventPublisher, RelationshipService,
};
use domain::entities::{RequestDecision, UserProfile, UserRole};
use domain::value_objects::UserId;

/// 测试辅助结构：封装全部服务与存储
struct TestServices {
    relationships: Arc<RelationshipService>,
    conversations: Arc<ConversationService>,
    messages: Arc<MessageService>,
    store: Arc<InMemoryChatStore>,
    directory: Arc<InMemoryUserDirectory>,
}

impl TestServices {
    fn new() -> Self {
        let store = Arc::new(InMemoryChatStore::new());
        let requests = Arc::new(InMemoryConnectionRequestStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let publisher = Arc::new(NullEventPublisher);

        Self {
            relationships: Arc::new(RelationshipService::new(
                requests,
                store.clone(),
                directory.clone(),
                publisher.clone(),
            )),
            conversations: Arc::new(ConversationService::new(store.clone(), directory.clone())),
            messages: Arc::new(MessageService::new(
                store.clone(),
                store.clone(),
                directory.clone(),
                publisher,
            )),
            store,
            directory,
        }
    }

    async fn register(&self, role: UserRole) -> UserId {
        let id = UserId::new();
        self.directory
            .upsert(UserProfile::new(id, "测试用户", role))
            .await;
        id
    }
}

/// 并发重复发起连接请求，最多一条待处理请求成立
#[tokio::test]
async fn test_concurrent_duplicate_requests() {
    let services = TestServices::new();
    let customer = services.register(UserRole::Customer).await;
    let trainer = services.register(UserRole::Trainer).await;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let relationships = services.relationships.clone();
            tokio::spawn(async move {
                relationships
                    .request_connection(customer, trainer, None)
                    .await
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);

    let inbox = services
        .relationships
        .list_requests_for_trainer(trainer)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
}

/// 并发处理同一请求，恰好一个成功
#[tokio::test]
async fn test_concurrent_responds_single_winner() {
    let services = TestServices::new();
    let customer = services.register(UserRole::Customer).await;
    let trainer = services.register(UserRole::Trainer).await;

    let request = services
        .relationships
        .request_connection(customer, trainer, None)
        .await
        .unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let relationships = services.relationships.clone();
            let decision = if i % 2 == 0 {
                RequestDecision::Accepted
            } else {
                RequestDecision::Rejected
            };
            tokio::spawn(async move {
                relationships
                    .respond_to_connection(trainer, request.id, decision)
                    .await
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);

    // 请求处于终态
    let request = services
        .relationships
        .find_request(request.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!request.is_pending());
}

/// 并发查找或创建一对一会话，全部返回同一会话
#[tokio::test]
async fn test_concurrent_direct_conversation_dedup() {
    let services = TestServices::new();
    let a = services.register(UserRole::Customer).await;
    let b = services.register(UserRole::Trainer).await;

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let conversations = services.conversations.clone();
            // 交替参数顺序
            let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
            tokio::spawn(async move { conversations.create_or_get_direct(x, y).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    let first_id = results[0].id;
    assert!(results.iter().all(|c| c.id == first_id));

    let listed = services.conversations.list_for_user(a).await.unwrap();
    assert_eq!(listed.len(), 1);
}

/// 并发发送消息后指针指向某条真实存在的消息，历史完整
#[tokio::test]
async fn test_concurrent_sends_keep_pointer_valid() {
    use domain::repositories::ConversationRepository;

    let services = TestServices::new();
    let a = services.register(UserRole::Customer).await;
    let b = services.register(UserRole::Trainer).await;
    let conversation = services
        .conversations
        .create_or_get_direct(a, b)
        .await
        .unwrap();

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let messages = services.messages.clone();
            let sender = if i % 2 == 0 { a } else { b };
            let conversation_id = conversation.id;
            tokio::spawn(async move {
                messages
                    .send_message(sender, conversation_id, format!("第{i}条").as_str())
                    .await
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();
    assert_eq!(results.len(), 20);

    let history = services
        .messages
        .fetch_messages(a, conversation.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 20);

    // 指针必须指向历史中真实存在的消息
    let state = services
        .store
        .find_by_id(conversation.id)
        .await
        .unwrap()
        .unwrap();
    let latest = state.latest_message.unwrap();
    assert!(history.iter().any(|m| m.id == latest));
}

/// 已读标记与新消息交错：快照之后的消息保持未读
#[tokio::test]
async fn test_mark_read_interleaved_with_send() {
    let services = TestServices::new();
    let a = services.register(UserRole::Customer).await;
    let b = services.register(UserRole::Trainer).await;
    let conversation = services
        .conversations
        .create_or_get_direct(a, b)
        .await
        .unwrap();

    for i in 0..5 {
        services
            .messages
            .send_message(a, conversation.id, format!("早批{i}").as_str())
            .await
            .unwrap();
    }

    services.messages.mark_read(b, conversation.id).await.unwrap();

    services
        .messages
        .send_message(a, conversation.id, "晚批")
        .await
        .unwrap();
    assert_eq!(services.messages.unread_count(b).await.unwrap(), 1);
}
