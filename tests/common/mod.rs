//! Shared utilities for integration testing: an in-process mock relay.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use relay_client::blockchain::{KeySigner, Wallet};
use relay_client::config::RelayConfig;
use relay_client::RelayClient;

/// Anvil's first development key.
pub const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const RECIPIENT: &str = "0x3535353535353535353535353535353535353535";
pub const SERVER_TIMESTAMP: i64 = 1_500_000_000;
pub const UNSIGNED_TX: &str = "0xe8808504a817c8008252089435353535353535353535353535353535353535358203e880";

/// One request as the mock relay saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// How the mock answers one endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, String),
    /// Never answers within any sane client timeout.
    Hang,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Json(200, body.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Behavior {
    pub timestamp: Reply,
    pub skeleton: Reply,
    pub broadcast: Reply,
    pub balance: Reply,
    pub register: Reply,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            timestamp: Reply::ok(&format!(r#"{{"timestamp":{}}}"#, SERVER_TIMESTAMP)),
            skeleton: Reply::ok(&format!(
                r#"{{"tx":"{}","gas":"0x5208","gasPrice":"0x4a817c800","nonce":"0x0"}}"#,
                UNSIGNED_TX
            )),
            broadcast: Reply::ok(r#"{"tx_hash":"0xfeedface"}"#),
            // 1 ether
            balance: Reply::ok(r#"{"confirmed_balance":"0xde0b6b3a7640000"}"#),
            register: Reply::ok("{}"),
        }
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    behavior: Mutex<Behavior>,
}

/// Handle to a running mock relay.
#[derive(Clone)]
pub struct MockRelay {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockRelay {
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(MockState {
            requests: Mutex::new(Vec::new()),
            behavior: Mutex::new(behavior),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_behavior(&self, update: impl FnOnce(&mut Behavior)) {
        update(&mut self.state.behavior.lock().unwrap());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Config pointed at this mock with short timeouts and fast retries.
    pub fn config(&self) -> RelayConfig {
        let mut config = RelayConfig::default();
        config.api.base_url = self.base_url();
        config.api.request_timeout_ms = 500;
        config.api.connect_timeout_ms = 500;
        config.retries.base_delay_ms = 5;
        config.retries.max_delay_ms = 20;
        config
    }

    pub fn client(&self) -> RelayClient {
        let key: Arc<dyn KeySigner> = Arc::new(test_wallet());
        RelayClient::new(&self.config(), Some(key)).unwrap()
    }

    pub fn read_only_client(&self) -> RelayClient {
        RelayClient::new(&self.config(), None).unwrap()
    }
}

pub fn test_wallet() -> Wallet {
    Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap()
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        headers,
        body: body.to_vec(),
    });

    let reply = {
        let behavior = state.behavior.lock().unwrap();
        match (method.as_str(), path.as_str()) {
            ("GET", "/v1/timestamp") => behavior.timestamp.clone(),
            ("POST", "/v1/tx/skel") => behavior.skeleton.clone(),
            ("POST", "/v1/tx") => behavior.broadcast.clone(),
            ("GET", p) if p.starts_with("/v1/balance/") => behavior.balance.clone(),
            ("POST", "/v1/register") | ("POST", "/v1/deregister") | ("POST", "/v1/apn/register") => {
                behavior.register.clone()
            }
            _ => Reply::Json(404, r#"{"errors":[{"code":"not_found"}]}"#.to_string()),
        }
    };

    match reply {
        Reply::Json(status, body) => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}
