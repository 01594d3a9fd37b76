//! Leaderboard persistence
//!
//! The store holds one JSON document, read and written whole. The session
//! never awaits the store itself: it queues [`StoreRequest`]s, the shell runs
//! them with [`execute`] and hands the [`StoreResponse`] back.
//!
//! Backends:
//! - `MemoryStore`: in-process document (native builds, tests)
//! - `LocalStorageStore`: browser LocalStorage (wasm only)
//! - `GistStore`: one file in a GitHub gist (wasm only)

pub mod document;
pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::future::Future;

use crate::leaderboard::LeaderboardEntry;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use web::{GistStore, LocalStorageStore, WebStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("leaderboard store unavailable: {0}")]
    Unavailable(String),

    #[error("leaderboard store answered HTTP {status}")]
    Http { status: u16 },

    #[error("malformed leaderboard document: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode leaderboard: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("browser error: {0}")]
    Js(String),
}

/// Whole-document leaderboard storage
pub trait LeaderboardStore {
    /// Read every stored entry
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<LeaderboardEntry>, StoreError>>;

    /// Overwrite the document with `entries`
    fn replace_all(
        &self,
        entries: Vec<LeaderboardEntry>,
    ) -> impl Future<Output = Result<(), StoreError>>;
}

/// Work the session wants done against the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    Fetch,
    ReplaceAll(Vec<LeaderboardEntry>),
}

/// Completion of a [`StoreRequest`]
#[derive(Debug)]
pub enum StoreResponse {
    Fetched(Result<Vec<LeaderboardEntry>, StoreError>),
    Submitted(Result<(), StoreError>),
}

/// Run one request to completion against `store`
pub async fn execute<S: LeaderboardStore>(store: &S, request: StoreRequest) -> StoreResponse {
    match request {
        StoreRequest::Fetch => StoreResponse::Fetched(store.fetch_all().await),
        StoreRequest::ReplaceAll(entries) => {
            StoreResponse::Submitted(store.replace_all(entries).await)
        }
    }
}
