// tests/common/mod.rs
#![allow(dead_code)]

use fundfolio::notify::NotificationCenter;
use fundfolio::storage::MemoryStorage;
use fundfolio::{Api, Gateway, SessionStore, TokenTransport};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use warp::http::{Response, StatusCode};
use warp::Filter;

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Opaque bearer token as the backend would mint it.
pub fn create_token(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: 10000000000,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test_secret_key"),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url_query_pairs(&self.query)
    }
}

fn url_query_pairs(query: &str) -> Vec<(String, String)> {
    let url = Url::parse(&format!("http://mock/?{}", query)).unwrap();
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Canned {
    status: u16,
    body: String,
    content_type: Option<&'static str>,
}

impl Canned {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: Some("application/json"),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: Some("text/plain"),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            content_type: None,
        }
    }
}

/// In-process backend that answers from a fixed table keyed by
/// `"METHOD /path"` and records every request it sees.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub async fn start(routes: Vec<(&str, Canned)>) -> Self {
        let table: Arc<HashMap<String, Canned>> = Arc::new(
            routes
                .into_iter()
                .map(|(key, canned)| (key.to_string(), canned))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        let route = warp::method()
            .and(warp::path::full())
            .and(
                warp::query::raw()
                    .or(warp::any().map(String::new))
                    .unify(),
            )
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::bytes())
            .map(
                move |method: warp::http::Method,
                      path: warp::path::FullPath,
                      query: String,
                      authorization: Option<String>,
                      body: warp::hyper::body::Bytes| {
                    let recorded = Recorded {
                        method: method.to_string(),
                        path: path.as_str().to_string(),
                        query,
                        authorization,
                        body: serde_json::from_slice(&body).ok(),
                    };
                    let key = format!("{} {}", recorded.method, recorded.path);
                    log.lock().unwrap().push(recorded);

                    let canned = table.get(&key).cloned().unwrap_or_else(|| {
                        Canned::json(404, serde_json::json!({"detail": "Not Found"}))
                    });
                    let mut response = Response::builder()
                        .status(StatusCode::from_u16(canned.status).unwrap());
                    if let Some(content_type) = canned.content_type {
                        response = response.header("content-type", content_type);
                    }
                    response.body(canned.body).unwrap()
                },
            );

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, requests }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Base URL nothing listens on.
pub fn unreachable_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

pub fn api(base_url: Url, transport: TokenTransport) -> (Api, Arc<NotificationCenter>) {
    let center = Arc::new(NotificationCenter::new());
    let api = Api::new(Gateway::new(base_url, transport), center.clone());
    (api, center)
}

pub fn store(
    base_url: Url,
) -> (SessionStore, Arc<MemoryStorage>, Arc<NotificationCenter>) {
    let (api, center) = api(base_url, TokenTransport::Legacy);
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(api, storage.clone());
    (store, storage, center)
}
