//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use classhub_api::{AppState, Backends, build_app, build_state};
use classhub_auth::JwtEncoder;
use classhub_core::config::AppConfig;
use classhub_core::types::{ClassId, ConversationId, UserId};
use classhub_database::ChatStore;
use classhub_entity::class::ClassRoster;
use classhub_entity::user::{UserProfile, UserRole};

/// How long a client waits for a frame before failing the test.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// Shared state, for seeding through the services.
    pub state: AppState,
    encoder: JwtEncoder,
}

/// A seeded user and a valid access token for them.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub token: String,
}

impl TestApp {
    /// Create a test application over memory backends.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.cache.provider = "memory".to_string();
        config.storage.provider = "local".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let backends = Backends::connect(&config)
            .await
            .expect("Failed to connect memory backends");
        let encoder = JwtEncoder::new(&config.auth);
        let state = build_state(config, backends);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            encoder,
        }
    }

    /// Create a user in the directory and mint an access token for them.
    pub async fn create_user(&self, name: &str, role: UserRole) -> TestUser {
        let id = UserId::new();
        self.state
            .store
            .upsert_user(&UserProfile {
                id,
                display_name: name.to_string(),
                role,
                avatar_key: None,
            })
            .await
            .expect("Failed to create test user");

        let (token, _) = self
            .encoder
            .generate_access_token(id, role, name)
            .expect("Failed to mint access token");

        TestUser { id, token }
    }

    /// Create a class whose conversation holds the given members.
    pub async fn create_class(&self, teachers: &[&TestUser], students: &[&TestUser]) -> ClassId {
        let class_id = ClassId::new();
        self.state
            .conversations
            .sync_roster(&ClassRoster {
                class_id,
                teacher_ids: teachers.iter().map(|u| u.id).collect(),
                student_ids: students.iter().map(|u| u.id).collect(),
            })
            .await
            .expect("Failed to sync roster");
        class_id
    }

    /// The conversation of a class.
    pub async fn conversation_of(&self, class_id: ClassId) -> ConversationId {
        self.state
            .store
            .find_conversation_by_class(class_id)
            .await
            .expect("Store lookup failed")
            .expect("Class has no conversation")
            .id
    }

    /// Make an HTTP request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });
        addr
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
}

/// A WebSocket client speaking the JSON event protocol.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect and authenticate with `token`.
    pub async fn connect(addr: SocketAddr, token: &str) -> Self {
        let url = format!("ws://{addr}/ws?token={token}");
        let (stream, _) = connect_async(url).await.expect("WebSocket connect failed");
        Self { stream }
    }

    /// Send one event.
    pub async fn send(&mut self, event: Value) {
        self.stream
            .send(Message::Text(event.to_string().into()))
            .await
            .expect("WebSocket send failed");
    }

    /// Send a raw text frame.
    pub async fn send_raw(&mut self, frame: &str) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("WebSocket send failed");
    }

    /// Receive the next event, skipping heartbeat pings.
    pub async fn recv(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for an event")
                .expect("WebSocket closed")
                .expect("WebSocket read failed");

            if let Message::Text(text) = frame {
                let event: Value =
                    serde_json::from_str(text.as_str()).expect("Server sent invalid JSON");
                if event["type"] != "ping" {
                    return event;
                }
            }
        }
    }

    /// Receive the next event and assert its type.
    pub async fn expect(&mut self, event_type: &str) -> Value {
        let event = self.recv().await;
        assert_eq!(event["type"], event_type, "unexpected event: {event}");
        event
    }

    /// Assert that no event arrives within `wait`.
    pub async fn expect_silence(&mut self, wait: Duration) {
        loop {
            match tokio::time::timeout(wait, self.stream.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => {
                    let event: Value =
                        serde_json::from_str(text.as_str()).expect("Server sent invalid JSON");
                    assert_eq!(event["type"], "ping", "unexpected event: {event}");
                }
                Ok(Some(Ok(_))) => {}
                Ok(other) => panic!("WebSocket ended: {other:?}"),
            }
        }
    }

    /// Join a class conversation and return its id.
    pub async fn join_class(&mut self, class_id: ClassId) -> String {
        self.send(serde_json::json!({
            "type": "join_conversation",
            "class_id": class_id,
        }))
        .await;
        let joined = self.expect("conversation_joined").await;
        joined["conversation_id"]
            .as_str()
            .expect("conversation_id missing")
            .to_string()
    }
}
