#![allow(dead_code)]

//! Loopback axum servers used by the integration tests.
//!
//! Each server runs on its own thread and runtime so it can back both async tests and
//! tests that drive the compiled binary.

use std::net::TcpListener as StdTcpListener;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::post;
use axum::Router;

const UPLOAD_PATH: &str = "/api/upload";

#[derive(Debug)]
pub struct CapturedPart {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content: Bytes,
}

#[derive(Debug)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub parts: Vec<CapturedPart>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// File names of the multipart parts, in the order they were sent.
    pub fn file_names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| part.file_name.as_deref())
            .collect()
    }
}

#[derive(Clone)]
struct CannedReply {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Sender<CapturedRequest>>>,
}

async fn record_upload(
    State(reply): State<CannedReply>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .expect("well-formed multipart body")
    {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await.expect("readable multipart part");
        parts.push(CapturedPart {
            field_name,
            file_name,
            content,
        });
    }

    let request = CapturedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        parts,
    };
    if let Ok(sender) = reply.captured.lock() {
        let _ = sender.send(request);
    }
    (reply.status, reply.body)
}

/// Serves `app` on 127.0.0.1 from a background thread and returns the upload URL.
fn serve_in_background(app: Router) -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    listener
        .set_nonblocking(true)
        .expect("non-blocking listener");
    let url = format!(
        "http://{}{UPLOAD_PATH}",
        listener.local_addr().expect("listener address")
    );

    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub server runtime");
        runtime.block_on(async move {
            let listener =
                tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, app).await.expect("stub server");
        });
    });
    url
}

pub struct StubServer {
    pub url: String,
    captured: Receiver<CapturedRequest>,
}

impl StubServer {
    /// Answers every upload with `status` and `body`, recording each request.
    pub fn replying(status: u16, body: &str) -> Self {
        let (sender, captured) = mpsc::channel();
        let reply = CannedReply {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body: body.to_string(),
            captured: Arc::new(Mutex::new(sender)),
        };
        let app = Router::new()
            .route(UPLOAD_PATH, post(record_upload))
            .with_state(reply);
        Self {
            url: serve_in_background(app),
            captured,
        }
    }

    /// Waits for the first recorded upload.
    pub fn captured(self) -> CapturedRequest {
        self.captured
            .recv_timeout(Duration::from_secs(10))
            .expect("an upload reached the stub server")
    }
}

/// Accepts uploads and answers only after `hold_for`.
pub fn hanging_endpoint(hold_for: Duration) -> String {
    let app = Router::new().route(
        UPLOAD_PATH,
        post(move || async move {
            tokio::time::sleep(hold_for).await;
            StatusCode::OK
        }),
    );
    serve_in_background(app)
}

/// A URL on a port nobody listens on.
pub fn refused_endpoint() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}{UPLOAD_PATH}")
}
