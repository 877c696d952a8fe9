//! Live HTTP peer for the client's integration tests.
//!
//! # Design
//! Each route exercises one part of the client contract: `/echo` reflects
//! the method, headers and body it received; `/cookies` answers with a
//! repeated `Set-Cookie` header; `/users/{id}` checks URI substitution;
//! `/status/{code}` answers with an arbitrary status.

use axum::{
    body::Bytes,
    extract::Path,
    http::{header::SET_COOKIE, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/cookies", get(cookies))
        .route("/users/{id}", get(user))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn cookies() -> impl IntoResponse {
    (AppendHeaders([(SET_COOKIE, "a=1"), (SET_COOKIE, "b=2")]), "ok")
}

async fn user(Path(id): Path<String>) -> Json<User> {
    Json(User { id })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}
