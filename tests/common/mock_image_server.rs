//! Mock image host

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use super::jpeg_fixture;

pub const FIXTURE_WIDTH: u32 = 1200;
pub const FIXTURE_HEIGHT: u32 = 800;

/// Serves:
/// - `/photos/{name}`: a 1200x800 JPEG labelled `image/jpeg`
/// - `/untyped.jpg`: the same JPEG without a content type
/// - `/missing.jpg`: 404
/// - `/page.html`: an HTML page
/// - `/empty.jpg`: an empty `image/jpeg` body
/// - `/slow.jpg`: the JPEG after a two second delay
/// - `/flaky.jpg`: 503 for the first `flaky_failures` requests, then the JPEG
pub struct MockImageServer {
    addr: SocketAddr,
    state: Arc<ImageServerState>,
    _handle: tokio::task::JoinHandle<()>,
}

struct ImageServerState {
    jpeg: Vec<u8>,
    flaky_failures: usize,
    flaky_hits: AtomicUsize,
    photo_hits: AtomicUsize,
}

impl MockImageServer {
    pub async fn new() -> Self {
        Self::with_flaky_failures(0).await
    }

    pub async fn with_flaky_failures(flaky_failures: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(ImageServerState {
            jpeg: jpeg_fixture(FIXTURE_WIDTH, FIXTURE_HEIGHT),
            flaky_failures,
            flaky_hits: AtomicUsize::new(0),
            photo_hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/photos/{name}", get(photo))
            .route("/untyped.jpg", get(untyped))
            .route("/missing.jpg", get(missing))
            .route("/page.html", get(page))
            .route("/empty.jpg", get(empty))
            .route("/slow.jpg", get(slow))
            .route("/flaky.jpg", get(flaky))
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

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn photo_url(&self, name: &str) -> String {
        self.url(&format!("/photos/{}.jpg", name))
    }

    pub fn jpeg(&self) -> &[u8] {
        &self.state.jpeg
    }

    pub fn flaky_hits(&self) -> usize {
        self.state.flaky_hits.load(Ordering::SeqCst)
    }

    pub fn photo_hits(&self) -> usize {
        self.state.photo_hits.load(Ordering::SeqCst)
    }
}

fn jpeg_response(state: &ImageServerState) -> Response {
    ([(CONTENT_TYPE, "image/jpeg")], state.jpeg.clone()).into_response()
}

async fn photo(State(state): State<Arc<ImageServerState>>) -> Response {
    state.photo_hits.fetch_add(1, Ordering::SeqCst);
    jpeg_response(&state)
}

async fn untyped(State(state): State<Arc<ImageServerState>>) -> Response {
    Response::new(Body::from(state.jpeg.clone()))
}

async fn missing() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

async fn page() -> Response {
    (
        [(CONTENT_TYPE, "text/html; charset=utf-8")],
        "<html><body>Not a photo</body></html>",
    )
        .into_response()
}

async fn empty() -> Response {
    ([(CONTENT_TYPE, "image/jpeg")], Vec::<u8>::new()).into_response()
}

async fn slow(State(state): State<Arc<ImageServerState>>) -> Response {
    tokio::time::sleep(Duration::from_secs(2)).await;
    jpeg_response(&state)
}

async fn flaky(State(state): State<Arc<ImageServerState>>) -> Response {
    let hit = state.flaky_hits.fetch_add(1, Ordering::SeqCst);
    if hit < state.flaky_failures {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    jpeg_response(&state)
}
