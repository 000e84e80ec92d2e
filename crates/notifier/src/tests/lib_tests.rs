use super::*;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct CapturedRequest {
    authorization: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct ProviderState {
    status: StatusCode,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn fake_send_email(
    State(state): State<ProviderState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.captured.lock().await.push(CapturedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });
    if state.status.is_success() {
        (state.status, Json(serde_json::json!({ "id": "email_123" })))
    } else {
        (
            state.status,
            Json(serde_json::json!({ "message": "invalid `from` field" })),
        )
    }
}

async fn spawn_provider(status: StatusCode) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/emails", post(fake_send_email))
        .with_state(ProviderState {
            status,
            captured: captured.clone(),
        });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), captured)
}

fn config_with_key(api_url: &str, api_key: Option<&str>) -> NotifierConfig {
    NotifierConfig {
        api_key: api_key.map(str::to_string),
        api_url: api_url.to_string(),
        ..NotifierConfig::default()
    }
}

struct RecordingDispatcher {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, DispatchError> {
        self.sent.lock().await.push(email.clone());
        Ok(DispatchReceipt::default())
    }
}

#[test]
fn missing_or_blank_key_leaves_notifier_unconfigured() {
    assert!(!Notifier::from_config(&NotifierConfig::default()).is_configured());
    assert!(!Notifier::from_config(&config_with_key(DEFAULT_API_URL, Some("  "))).is_configured());
    assert!(Notifier::from_config(&config_with_key(DEFAULT_API_URL, Some("re_123"))).is_configured());
}

#[test]
fn debug_output_redacts_the_api_key() {
    let config = config_with_key(DEFAULT_API_URL, Some("re_secret"));
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("re_secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn endpoint_tolerates_trailing_slash() {
    let dispatcher = ResendDispatcher::new("http://localhost:9000/", "key");
    assert_eq!(dispatcher.endpoint(), "http://localhost:9000/emails");
}

#[tokio::test]
async fn unconfigured_notifier_reports_instead_of_failing_hard() {
    let err = Notifier::Unconfigured
        .notify_operator("subject", "text")
        .await
        .expect_err("should not send");
    assert!(matches!(err, DispatchError::NotConfigured));
}

#[tokio::test]
async fn notify_operator_addresses_the_fixed_operator() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let notifier = Notifier::with_dispatcher(
        Arc::new(RecordingDispatcher { sent: sent.clone() }),
        "ops@example.com",
        "Site <noreply@example.com>",
    );

    notifier
        .notify_operator("New contact", "Hi")
        .await
        .expect("sent");

    let sent = sent.lock().await;
    assert_eq!(
        sent.as_slice(),
        &[OutboundEmail {
            from: "Site <noreply@example.com>".into(),
            to: "ops@example.com".into(),
            subject: "New contact".into(),
            text: "Hi".into(),
        }]
    );
}

#[tokio::test]
async fn resend_dispatcher_posts_bearer_authenticated_json() {
    let (api_url, captured) = spawn_provider(StatusCode::OK).await;
    let notifier = Notifier::from_config(&config_with_key(&api_url, Some("re_test_key")));

    let receipt = notifier
        .notify_operator("New contact form submission from ann@x.com", "Hi")
        .await
        .expect("sent");
    assert_eq!(receipt.provider_id.as_deref(), Some("email_123"));

    let captured = captured.lock().await;
    assert_eq!(captured.len(), 1);
    assert_eq!(
        captured[0].authorization.as_deref(),
        Some("Bearer re_test_key")
    );
    assert_eq!(
        captured[0].body,
        serde_json::json!({
            "from": DEFAULT_SENDER,
            "to": [DEFAULT_OPERATOR_ADDRESS],
            "subject": "New contact form submission from ann@x.com",
            "text": "Hi",
        })
    );
}

#[tokio::test]
async fn provider_rejection_surfaces_status_only() {
    let (api_url, _captured) = spawn_provider(StatusCode::UNPROCESSABLE_ENTITY).await;
    let dispatcher = ResendDispatcher::new(&api_url, "re_test_key");

    let err = dispatcher
        .send(&OutboundEmail {
            from: DEFAULT_SENDER.into(),
            to: DEFAULT_OPERATOR_ADDRESS.into(),
            subject: "s".into(),
            text: "t".into(),
        })
        .await
        .expect_err("should be rejected");
    assert!(matches!(err, DispatchError::Rejected { status: 422 }));
    assert!(!err.to_string().contains("invalid `from` field"));
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let dispatcher = ResendDispatcher::new(&format!("http://{addr}"), "re_test_key");
    let err = dispatcher
        .send(&OutboundEmail {
            from: DEFAULT_SENDER.into(),
            to: DEFAULT_OPERATOR_ADDRESS.into(),
            subject: "s".into(),
            text: "t".into(),
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, DispatchError::Transport(_)));
}
