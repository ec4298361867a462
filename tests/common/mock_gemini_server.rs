//! Mock Gemini `generateContent` endpoint

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{header::RETRY_AFTER, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "test-api-key";

/// One scripted answer.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// 200 with a single candidate carrying this text
    Text(String),
    /// Error status with a Gemini-style error body
    Error { status: u16, message: String },
    /// 429 with a `Retry-After` header
    RateLimited { retry_after_secs: u64 },
    /// 200 with the prompt blocked and no candidates
    Blocked(String),
    /// 200 with this text after a delay
    Delayed { text: String, delay: Duration },
}

impl MockReply {
    pub fn text(text: &str) -> Self {
        MockReply::Text(text.to_string())
    }

    pub fn error(status: u16, message: &str) -> Self {
        MockReply::Error {
            status,
            message: message.to_string(),
        }
    }
}

/// A captured request.
#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub target: String,
    pub body: Value,
}

/// Replies are consumed in order; the last one repeats.
pub struct MockGeminiServer {
    addr: SocketAddr,
    state: Arc<GeminiState>,
    _handle: tokio::task::JoinHandle<()>,
}

struct GeminiState {
    replies: Mutex<Vec<MockReply>>,
    received: Mutex<Vec<ReceivedRequest>>,
}

impl MockGeminiServer {
    pub async fn new(reply: MockReply) -> Self {
        Self::with_script(vec![reply]).await
    }

    pub async fn with_script(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "mock needs at least one reply");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(GeminiState {
            replies: Mutex::new(replies),
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1beta/models/{target}", post(generate_content))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(10)).await;

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.received.lock().unwrap().len()
    }
}

fn next_reply(state: &GeminiState) -> MockReply {
    let mut replies = state.replies.lock().unwrap();
    if replies.len() > 1 {
        replies.remove(0)
    } else {
        replies[0].clone()
    }
}

fn error_body(status: u16, message: &str, code: &str) -> Value {
    json!({
        "error": {
            "code": status,
            "message": message,
            "status": code
        }
    })
}

fn text_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": 1290,
            "candidatesTokenCount": 48,
            "totalTokenCount": 1338
        }
    })
}

async fn generate_content(
    State(state): State<Arc<GeminiState>>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !target.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    state.received.lock().unwrap().push(ReceivedRequest {
        target: target.clone(),
        body,
    });

    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if key != TEST_API_KEY {
        return (
            StatusCode::BAD_REQUEST,
            Json(error_body(
                400,
                "API key not valid. Please pass a valid API key.",
                "INVALID_ARGUMENT",
            )),
        )
            .into_response();
    }

    match next_reply(&state) {
        MockReply::Text(text) => Json(text_body(&text)).into_response(),
        MockReply::Error { status, message } => {
            let status = StatusCode::from_u16(status).unwrap();
            (
                status,
                Json(error_body(status.as_u16(), &message, "UNAVAILABLE")),
            )
                .into_response()
        }
        MockReply::RateLimited { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, retry_after_secs.to_string())],
            Json(error_body(
                429,
                "Resource has been exhausted (e.g. check quota).",
                "RESOURCE_EXHAUSTED",
            )),
        )
            .into_response(),
        MockReply::Blocked(reason) => Json(json!({
            "promptFeedback": { "blockReason": reason }
        }))
        .into_response(),
        MockReply::Delayed { text, delay } => {
            tokio::time::sleep(delay).await;
            Json(text_body(&text)).into_response()
        }
    }
}
