//! Session action tests
//!
//! The action is driven from a plain thread, the way the host tool calls it

use async_trait::async_trait;
use otpinject::models::{Credentials, Header, HttpRequest, Parameter, ParameterType};
use otpinject::providers::{MessageProvider, ProviderReply};
use otpinject::services::{CredentialStore, KeyValueStore, MemoryStore, OtpFetcher, RuleStore};
use otpinject::{OtpError, RewriteError, SessionAction, SessionError, SESSION_ACTION_NAME};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::runtime::Builder;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

struct FakeProvider {
    calls: AtomicUsize,
    reply: ProviderReply,
}

impl FakeProvider {
    fn new(status: u16, reason: &str, body: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: ProviderReply {
                status,
                reason: reason.to_string(),
                body: body.to_string(),
            },
        })
    }

    fn with_message(text: &str) -> Arc<Self> {
        let body = serde_json::json!({ "messages": [{ "body": text }] }).to_string();
        Self::new(200, "OK", &body)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list_messages(&self, _credentials: &Credentials, _page_size: u32) -> anyhow::Result<ProviderReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Action wired to in-memory settings
struct Harness {
    rules: Arc<RuleStore>,
    action: SessionAction,
}

fn harness(provider: Arc<FakeProvider>, rule: Option<(&str, &str)>) -> Harness {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let credentials = Arc::new(CredentialStore::load(storage.clone()));
    credentials.update(Credentials::new("ACtest", "secret", "+15550001111", "+15550002222"));

    let rules = Arc::new(RuleStore::new(storage));
    if let Some((kind, name)) = rule {
        rules.save(kind, name).unwrap();
    }

    let fetcher = OtpFetcher::new(provider, credentials);
    let action = SessionAction::new(rules.clone(), fetcher).unwrap();

    Harness { rules, action }
}

fn create_test_request() -> HttpRequest {
    HttpRequest::new("POST", "/login/verify")
        .with_header(Header::new("Host", "app.example.com"))
        .with_parameter(Parameter::new(ParameterType::Cookie, "session", "abc"))
        .with_body(r#"{"user":"bob","otp":""}"#)
}

#[test]
fn test_action_name() {
    let h = harness(FakeProvider::with_message("1234"), None);
    assert_eq!(h.action.name(), SESSION_ACTION_NAME);
    assert_eq!(SESSION_ACTION_NAME, "Twilio OTP Authenticate");
}

#[test]
fn test_no_rule_forwards_original_without_fetching() {
    let provider = FakeProvider::with_message("Your code is 048213");
    let h = harness(provider.clone(), None);
    let request = create_test_request();

    assert!(matches!(h.action.run(&request), Err(SessionError::MissingRule)));
    assert_eq!(h.action.perform(&request), request);
    assert_eq!(provider.calls(), 0);
}

#[test]
fn test_header_injection() {
    let provider = FakeProvider::with_message("Your code is 048213, expires in 5 min");
    let h = harness(provider.clone(), Some(("HEADER", "X-OTP")));
    let request = create_test_request();

    let rewritten = h.action.perform(&request);

    assert_eq!(rewritten.header("x-otp"), Some("048213"));
    assert_eq!(rewritten.headers.len(), request.headers.len() + 1);
    assert_eq!(rewritten.body, request.body);
    assert_eq!(provider.calls(), 1);
}

#[test]
fn test_body_regex_injection() {
    let h = harness(FakeProvider::with_message("code: 7788"), Some(("BODY_REGEX", "otp")));

    let rewritten = h.action.perform(&create_test_request());

    assert_eq!(rewritten.body, r#"{"user":"bob","otp":"7788"}"#);
}

#[test]
fn test_provider_failure_forwards_original() {
    let provider = FakeProvider::new(429, "Too Many Requests", r#"{"code":20429}"#);
    let h = harness(provider.clone(), Some(("HEADER", "X-OTP")));
    let request = create_test_request();

    match h.action.run(&request) {
        Err(SessionError::Fetch(OtpError::Provider { status, .. })) => assert_eq!(status, 429),
        other => panic!("expected provider failure, got {:?}", other),
    }

    let forwarded = h.action.perform(&request);
    assert_eq!(forwarded, request);
    assert_eq!(
        serde_json::to_vec(&forwarded).unwrap(),
        serde_json::to_vec(&request).unwrap()
    );
}

#[test]
fn test_body_regex_miss_forwards_original() {
    let h = harness(FakeProvider::with_message("code 4821"), Some(("BODY_REGEX", "code")));
    let request = create_test_request();

    match h.action.run(&request) {
        Err(SessionError::Rewrite(RewriteError::FieldNotFound(name))) => assert_eq!(name, "code"),
        other => panic!("expected field not found, got {:?}", other),
    }
    assert_eq!(h.action.perform(&request), request);
}

#[test]
fn test_no_otp_forwards_original() {
    let h = harness(FakeProvider::with_message("Welcome!"), Some(("COOKIE", "otp")));
    let request = create_test_request();

    assert!(matches!(
        h.action.run(&request),
        Err(SessionError::Fetch(OtpError::NoOtpFound))
    ));
    assert_eq!(h.action.perform(&request), request);
}

#[test]
fn test_rule_change_applies_to_next_request() {
    let h = harness(FakeProvider::with_message("1234"), Some(("URL_PARAM", "otp")));
    let request = create_test_request();

    let first = h.action.perform(&request);
    assert_eq!(first.parameter(ParameterType::Url, "otp"), Some("1234"));

    h.rules.save("COOKIE", "session").unwrap();

    let second = h.action.perform(&request);
    assert_eq!(second.parameter(ParameterType::Cookie, "session"), Some("1234"));
    assert_eq!(second.parameters.len(), request.parameters.len());
}

/// Counts ERROR events emitted on the current thread
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn errors_logged_by(f: impl FnOnce()) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(count.clone()));
    tracing::subscriber::with_default(subscriber, f);
    count.load(Ordering::SeqCst)
}

#[test]
fn test_perform_with_current_thread_runtime_handle() {
    let h = harness(FakeProvider::with_message("code 4821"), Some(("HEADER", "X-OTP")));
    let runtime = Builder::new_current_thread().enable_all().build().unwrap();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        // The caller's runtime is entered but nobody drives it
        let _guard = runtime.enter();
        let _ = tx.send(h.action.perform(&create_test_request()));
    });

    let rewritten = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("perform did not return");
    assert_eq!(rewritten.header("X-OTP"), Some("4821"));
}

#[test]
fn test_perform_inside_current_thread_task() {
    let provider = FakeProvider::with_message("code 4821");
    let h = harness(provider.clone(), Some(("COOKIE", "otp")));
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let runtime = Builder::new_current_thread().enable_all().build().unwrap();
        let rewritten = runtime.block_on(async { h.action.perform(&create_test_request()) });
        let _ = tx.send(rewritten);
    });

    let rewritten = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("perform did not return");
    assert_eq!(rewritten.parameter(ParameterType::Cookie, "otp"), Some("4821"));
    assert_eq!(provider.calls(), 1);
}

#[test]
fn test_fetch_failure_not_logged_as_error_again() {
    let h = harness(
        FakeProvider::new(429, "Too Many Requests", "{}"),
        Some(("HEADER", "X-OTP")),
    );
    let request = create_test_request();

    // The fetcher reports on its own worker thread; the adapter stays below ERROR
    assert_eq!(errors_logged_by(|| assert_eq!(h.action.perform(&request), request)), 0);
}

#[test]
fn test_rule_and_rewrite_failures_logged_as_error() {
    let no_rule = harness(FakeProvider::with_message("1234"), None);
    let request = create_test_request();
    assert_eq!(errors_logged_by(|| { no_rule.action.perform(&request); }), 1);

    let miss = harness(FakeProvider::with_message("1234"), Some(("BODY_REGEX", "code")));
    assert_eq!(errors_logged_by(|| { miss.action.perform(&request); }), 1);
}
