//! Shared harness: the full router on an ephemeral port over the memory store.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use pawsync_server::auth::issue_token;
use pawsync_server::config::Config;
use pawsync_server::store::MemoryStore;
use pawsync_server::{app, AppState};
use reqwest::{Client, Response};
use serde_json::{json, Value};

pub const SECRET: &str = "integration-secret";

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let config = Config::from_lookup(|key| match key {
            "AUTH_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::new(Arc::new(MemoryStore::new()), config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, owner: &str, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token(owner))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put(&self, owner: &str, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token(owner))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn patch(&self, owner: &str, path: &str, body: &Value) -> Response {
        self.client
            .patch(self.url(path))
            .bearer_auth(token(owner))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, owner: &str, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token(owner))
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, owner: &str, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token(owner))
            .send()
            .await
            .unwrap()
    }

    pub async fn upload(&self, owner: &str, pets: Value) -> Response {
        self.post(owner, "/sync/upload", &json!({ "pets": pets })).await
    }

    /// Download and return the decoded body.
    pub async fn download(&self, owner: &str, checkpoint: Option<&str>) -> Value {
        let response = self
            .post(owner, "/sync/download", &json!({ "last_synced_at": checkpoint }))
            .await;
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    pub async fn check_updates(&self, owner: &str, checkpoint: Option<&str>) -> Value {
        let response = self
            .post(
                owner,
                "/sync/check-updates",
                &json!({ "last_synced_at": checkpoint }),
            )
            .await;
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}

pub fn token(owner: &str) -> String {
    issue_token(SECRET, owner, Duration::hours(1)).unwrap()
}

pub fn pet(id: &str, name: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "Dog",
        "breed": "Labrador",
        "date_of_birth": "2020-06-15",
        "updated_at": updated_at,
        "events": [],
        "vaccines": []
    })
}

pub fn event(id: &str, kind: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "date": "2024-01-10",
        "observation": "all good",
        "updated_at": updated_at
    })
}

pub fn vaccine(id: &str, name: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "application_date": "2024-01-10",
        "next_dose_date": "2025-01-10",
        "updated_at": updated_at
    })
}

/// Find a pet by id in a download body.
pub fn find_pet<'a>(body: &'a Value, id: &str) -> Option<&'a Value> {
    body["pets"]
        .as_array()
        .and_then(|pets| pets.iter().find(|p| p["id"] == id))
}

pub fn same_instant(value: &Value, expected: &str) -> bool {
    let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).unwrap();
    value.as_str().map(parse) == Some(parse(expected))
}
