//! Stub IdeaHub API for tests: an axum server on an ephemeral port that
//! records every request and answers from a scripted route table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::config::Timeouts;
use crate::http::HttpClient;
use crate::session::SessionStore;
use crate::storage::MemoryTokenStorage;

/// One request as observed by the stub.
#[derive(Clone, Debug)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Scripted responses for one method + path. Responses are served in order;
/// the last one repeats.
#[derive(Clone, Debug)]
pub struct StubRoute {
    method: Method,
    path: String,
    responses: Vec<(u16, String)>,
}

impl StubRoute {
    pub fn new(method: Method, path: &str, status: u16, body: impl Into<String>) -> Self {
        Self { method, path: path.to_owned(), responses: vec![(status, body.into())] }
    }

    pub fn then(mut self, status: u16, body: impl Into<String>) -> Self {
        self.responses.push((status, body.into()));
        self
    }
}

#[derive(Clone, Default)]
struct StubState {
    routes: Arc<Mutex<HashMap<(Method, String), (Vec<(u16, String)>, usize)>>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct StubServer {
    pub base: String,
    state: StubState,
    _task: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start(routes: Vec<StubRoute>) -> Self {
        let state = StubState::default();
        {
            let mut table = state.routes.lock().unwrap();
            for route in routes {
                table.insert((route.method, route.path), (route.responses, 0));
            }
        }

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base: format!("http://{addr}"), state, _task: task }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> SeenRequest {
        self.seen().last().cloned().expect("stub saw no requests")
    }

    /// Adapter plus a fresh in-memory session pointed at this stub.
    pub fn client(&self, storage: MemoryTokenStorage) -> (HttpClient, SessionStore) {
        let session = SessionStore::initialize(storage);
        let http = HttpClient::configure(&self.base, Timeouts::default(), session.clone()).unwrap();
        (http, session)
    }
}

/// An address nothing listens on, for transport-failure tests.
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn handle(State(state): State<StubState>, method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(ToOwned::to_owned);
    state.seen.lock().unwrap().push(SeenRequest {
        method: method.to_string(),
        path: uri.path().to_owned(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body,
    });

    let mut table = state.routes.lock().unwrap();
    let Some((responses, next)) = table.get_mut(&(method, uri.path().to_owned())) else {
        return (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "application/json")], r#"{"detail":"Not Found"}"#)
            .into_response();
    };
    let index = (*next).min(responses.len() - 1);
    *next += 1;
    let (status, body) = responses[index].clone();
    let status = StatusCode::from_u16(status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
