//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Every variable that influences backend selection.
pub const REPOSITORY_ENV_KEYS: [&str; 4] =
    ["REPOSITORY_TYPE", "DATABASE_URL", "PG_DATABASE_URL", "DB_URI"];

/// Runs `f` with environment variables temporarily modified.
///
/// Access to the process environment is serialized across tests, and the
/// previous values are restored even if `f` panics.
///
/// `Some(v)` sets the variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

/// [`with_scoped_env`] with every repository variable cleared first.
pub fn with_repository_env<F, R>(set: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let mut changes: Vec<(&str, Option<&str>)> =
        REPOSITORY_ENV_KEYS.iter().map(|k| (*k, None)).collect();
    for (key, value) in set {
        changes.retain(|(k, _)| k != key);
        changes.push((key, Some(value)));
    }
    with_scoped_env(&changes, f)
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

#[cfg(feature = "http-server")]
pub use self::http::*;

#[cfg(feature = "http-server")]
mod http {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use pizzeria::db::repositories::LocalRepository;
    use pizzeria::http::{create_router, AppState};

    /// Router over a fresh in-memory repository, plus a handle on that
    /// repository for direct setup and assertions.
    pub fn test_app() -> (Router, LocalRepository) {
        let repo = LocalRepository::new();
        let router = create_router(AppState::from_repository(repo.clone()));
        (router, repo)
    }

    /// Send one request and return the status and raw body.
    pub async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        json_body: Option<&str>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match json_body {
            Some(raw) => {
                builder = builder.header("content-type", "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    /// Send one request and parse the body as JSON.
    pub async fn send_json(
        router: &Router,
        method: Method,
        uri: &str,
        json_body: Option<&str>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(router, method, uri, json_body).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}
