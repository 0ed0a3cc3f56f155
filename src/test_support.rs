//! In-memory doubles for the store and search seams, plus a request helper.

use std::sync::Mutex;

use axum::{
    async_trait,
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{CreateUser, NewUser, User},
    },
    history::repo::{HistoryStore, SearchHistory},
    search::{
        client::{SearchClient, SearchError},
        dto::{BackendSearchRequest, BackendSearchResponse},
    },
};

/// Users kept in a vector. `create` checks and inserts under one lock, like
/// a unique index would.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn soft_delete(&self, email: &str) {
        let mut users = self.users.lock().unwrap();
        for u in users.iter_mut().filter(|u| u.email == email) {
            u.deleted_at = Some(OffsetDateTime::now_utc());
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.deleted_at.is_none() && u.id == id)
            .cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<CreateUser> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.deleted_at.is_none() && u.email == new.email)
        {
            return Ok(CreateUser::ConflictExists);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            avatar: new.avatar,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(user.clone());
        Ok(CreateUser::Created(user))
    }
}

/// Looks empty to the pre-check but reports a unique violation on insert,
/// as when another registration wins the race in between.
pub struct ConflictingUserStore;

#[async_trait]
impl UserStore for ConflictingUserStore {
    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(None)
    }

    async fn create(&self, _user: NewUser) -> anyhow::Result<CreateUser> {
        Ok(CreateUser::ConflictExists)
    }
}

#[derive(Default)]
pub struct MemoryHistoryStore {
    rows: Mutex<(i64, Vec<SearchHistory>)>,
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn list_recent(&self, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<SearchHistory>> {
        let guard = self.rows.lock().unwrap();
        let mut rows: Vec<SearchHistory> = guard
            .1
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn record(&self, user_id: Uuid, query: &str) -> anyhow::Result<SearchHistory> {
        let mut guard = self.rows.lock().unwrap();
        let (next_id, rows) = &mut *guard;
        rows.retain(|r| !(r.user_id == user_id && r.query == query));
        *next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = SearchHistory {
            id: *next_id,
            user_id,
            query: query.to_string(),
            timestamp: now,
            created_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
        let mut guard = self.rows.lock().unwrap();
        let before = guard.1.len();
        guard.1.retain(|r| !(r.user_id == user_id && r.id == id));
        Ok(guard.1.len() < before)
    }

    async fn clear(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let mut guard = self.rows.lock().unwrap();
        let before = guard.1.len();
        guard.1.retain(|r| r.user_id != user_id);
        Ok((before - guard.1.len()) as u64)
    }
}

/// Search backend answering a fixed reply and remembering the last request.
pub struct StubSearch {
    reply: Result<BackendSearchResponse, SearchError>,
    last: Mutex<Option<BackendSearchRequest>>,
}

impl StubSearch {
    pub fn replying(reply: Result<BackendSearchResponse, SearchError>) -> Self {
        Self {
            reply,
            last: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::replying(Ok(BackendSearchResponse {
            results: Vec::new(),
            total: 0,
            page: 1,
            page_size: 10,
            total_pages: 0,
        }))
    }

    pub fn last_request(&self) -> Option<BackendSearchRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for StubSearch {
    async fn search(&self, req: &BackendSearchRequest) -> Result<BackendSearchResponse, SearchError> {
        *self.last.lock().unwrap() = Some(req.clone());
        self.reply.clone()
    }
}

/// Sends one request through the router and decodes the JSON reply
/// (`Value::Null` for an empty body).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}
