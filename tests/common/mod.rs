//! Shared fixtures for the integration tests.
//!
//! `MockApi` is an in-process axum server bound to a random local port. It
//! answers the auth and encode endpoints with canned replies and records
//! every request so tests can assert on headers, bodies and call counts.
//! `ScriptedPrompt` feeds the menu loop from a fixed list of lines.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use rle_client::config::{ApiSettings, RawApiSettings, RawCredentials};
use rle_client::ui::Prompt;

pub const AUTH_PATH: &str = "/api/v1.0/auth/token";
pub const ENCODE_PATH: &str = "/api/v1.0/encoding/rle";
pub const EMAIL: &str = "admin@gmail.com";
pub const PASSWORD: &str = "admin123!";

#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: &str) -> Self {
        Reply {
            status,
            body: body.to_string(),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(200, body)
    }
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: serde_json::Value,
}

struct Inner {
    auth: Reply,
    encode: Reply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Inner {
    fn record(&self, path: &str, headers: &HeaderMap, body: &Bytes) {
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let call = RecordedCall {
            path: path.to_string(),
            authorization: header_str(header::AUTHORIZATION),
            accept: header_str(header::ACCEPT),
            body: serde_json::from_slice(body).unwrap_or(serde_json::Value::Null),
        };
        self.calls.lock().unwrap().push(call);
    }
}

fn respond(reply: &Reply) -> (StatusCode, String) {
    (
        StatusCode::from_u16(reply.status).unwrap(),
        reply.body.clone(),
    )
}

async fn handle_auth(
    State(inner): State<Arc<Inner>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    inner.record(AUTH_PATH, &headers, &body);
    respond(&inner.auth)
}

async fn handle_encode(
    State(inner): State<Arc<Inner>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    inner.record(ENCODE_PATH, &headers, &body);
    respond(&inner.encode)
}

pub struct MockApi {
    inner: Arc<Inner>,
    pub base_url: String,
}

impl MockApi {
    /// Start the mock on `127.0.0.1:0` in a background thread with its own
    /// tokio runtime. The listener is bound before returning, so requests
    /// made right away queue instead of being refused.
    pub fn start(auth: Reply, encode: Reply) -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        let inner = Arc::new(Inner {
            auth,
            encode,
            calls: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route(AUTH_PATH, post(handle_auth))
            .route(ENCODE_PATH, post(handle_encode))
            .with_state(inner.clone());

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                axum::serve(listener, app).await
            })
            .unwrap();
        });

        MockApi {
            inner,
            base_url: format!("http://{addr}"),
        }
    }

    /// The usual happy path: token `abc`, encoded `a3b2`.
    pub fn happy() -> Self {
        Self::start(
            Reply::ok(r#"{"token":"abc"}"#),
            Reply::ok(r#"{"encoded":"a3b2"}"#),
        )
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    pub fn settings(&self) -> ApiSettings {
        settings_for(&self.base_url)
    }
}

pub fn settings_for(base_url: &str) -> ApiSettings {
    RawApiSettings {
        base_url: Some(base_url.to_string()),
        auth_endpoint: Some(AUTH_PATH.to_string()),
        encode_endpoint: Some(ENCODE_PATH.to_string()),
        credentials: RawCredentials {
            email: Some(EMAIL.to_string()),
            password: Some(PASSWORD.to_string()),
        },
        accept_invalid_certificates: None,
    }
    .validate()
    .unwrap()
}

/// A base URL nothing listens on: bind a port, then release it.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Prompt that replays fixed input lines and records everything shown.
pub struct ScriptedPrompt {
    inputs: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(inputs: &[&str]) -> Self {
        ScriptedPrompt {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn alert(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
