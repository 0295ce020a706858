use anyhow::Result;
use async_trait::async_trait;
use socialmap::assistant::{
    AnswerService, AssistantBridge, AssistantSession, ConversationLog, GeminiClient,
    GenerationRequest, Role, SubmitRejected, SERVICE_ERROR_FALLBACK,
};
use socialmap::config::config::AssistantConfig;
use socialmap::data::{Organization, OrganizationStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Answers only after `release` is notified
#[derive(Default)]
struct Gated {
    calls: AtomicUsize,
    context_sizes: std::sync::Mutex<Vec<usize>>,
    release: Notify,
}

#[async_trait]
impl AnswerService for Gated {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.context_sizes
            .lock()
            .unwrap()
            .push(request.prompt.matches("\"name\"").count());
        self.release.notified().await;
        Ok(Some("**Карітас Одеса** приймає заявки".to_string()))
    }
}

fn wait_for_reply(session: &mut AssistantSession, log: &mut ConversationLog) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !session.poll(log) {
        assert!(Instant::now() < deadline, "no reply within 5s");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_only_one_question_in_flight() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let service = Arc::new(Gated::default());
    let bridge = AssistantBridge::new(service.clone(), 0.4);
    let mut session = AssistantSession::new(bridge, runtime.handle().clone());
    let mut log = ConversationLog::with_welcome();

    let store = OrganizationStore::builtin();
    let context: Vec<Organization> = store.all().iter().take(3).cloned().collect();

    assert_eq!(session.submit("де знайти притулок?", context, &mut log), Ok(()));
    assert_eq!(
        session.submit("ще одне", Vec::new(), &mut log),
        Err(SubmitRejected::Busy)
    );
    assert!(session.is_in_flight());
    assert_eq!(log.len(), 2);
    assert_eq!(log.last().unwrap().role, Role::User);
    assert!(!session.poll(&mut log));

    service.release.notify_one();
    wait_for_reply(&mut session, &mut log);

    assert!(!session.is_in_flight());
    assert_eq!(log.len(), 3);
    assert_eq!(log.last().unwrap().role, Role::Assistant);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*service.context_sizes.lock().unwrap(), vec![3]);

    // The slot is free again
    assert_eq!(session.submit("дякую", Vec::new(), &mut log), Ok(()));
    service.release.notify_one();
    wait_for_reply(&mut session, &mut log);
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    assert_eq!(log.len(), 5);
}

#[test]
fn test_blank_question_is_not_sent() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let service = Arc::new(Gated::default());
    let bridge = AssistantBridge::new(service.clone(), 0.4);
    let mut session = AssistantSession::new(bridge, runtime.handle().clone());
    let mut log = ConversationLog::with_welcome();

    assert_eq!(
        session.submit("   ", Vec::new(), &mut log),
        Err(SubmitRejected::EmptyQuestion)
    );
    assert!(!session.is_in_flight());
    assert_eq!(log.len(), 1);
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_credentials_fall_back_to_error_message() {
    // Unreachable endpoint too, in case GEMINI_API_KEY is set on this machine
    let config = AssistantConfig {
        api_key_env: "SOCIALMAP_TEST_KEY_THAT_IS_NOT_SET".to_string(),
        endpoint: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 2,
        ..AssistantConfig::default()
    };
    let client = GeminiClient::new(&config).unwrap();
    let bridge = AssistantBridge::new(Arc::new(client), config.temperature);

    let store = OrganizationStore::builtin();
    let view: Vec<&Organization> = store.all().iter().collect();
    let reply = bridge.ask("Які фонди працюють в Одесі?", &view).await;
    assert_eq!(reply, SERVICE_ERROR_FALLBACK);
}
