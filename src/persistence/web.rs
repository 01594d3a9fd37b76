//! Browser leaderboard backends

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{LeaderboardStore, StoreError, document};
use crate::leaderboard::LeaderboardEntry;
use crate::settings::{StoreBackend, StoreSettings};

fn js_err(value: JsValue) -> StoreError {
    StoreError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

/// Document kept under one LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new("lane_hopper_leaderboard")
    }
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage".into()))
    }
}

impl LeaderboardStore for LocalStorageStore {
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let storage = Self::storage()?;
        let json = storage.get_item(&self.key).map_err(js_err)?.unwrap_or_default();
        let entries = document::decode(&json)?;
        log::info!("Loaded {} leaderboard entries", entries.len());
        Ok(entries)
    }

    async fn replace_all(&self, entries: Vec<LeaderboardEntry>) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let json = document::encode(&entries)?;
        storage.set_item(&self.key, &json).map_err(js_err)?;
        log::info!("Leaderboard saved ({} entries)", entries.len());
        Ok(())
    }
}

/// Document kept as one file of a GitHub gist
#[derive(Debug, Clone)]
pub struct GistStore {
    gist_id: String,
    token: String,
    file_name: String,
}

impl GistStore {
    const API: &'static str = "https://api.github.com/gists";

    pub fn new(
        gist_id: impl Into<String>,
        token: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            gist_id: gist_id.into(),
            token: token.into(),
            file_name: file_name.into(),
        }
    }

    async fn send(&self, method: &str, body: Option<String>) -> Result<String, StoreError> {
        let init = RequestInit::new();
        init.set_method(method);
        init.set_mode(RequestMode::Cors);
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(&body));
        }

        let url = format!("{}/{}", Self::API, self.gist_id);
        let request = Request::new_with_str_and_init(&url, &init).map_err(js_err)?;
        let headers = request.headers();
        headers.set("Accept", "application/vnd.github+json").map_err(js_err)?;
        headers
            .set("Authorization", &format!("token {}", self.token))
            .map_err(js_err)?;
        headers.set("Content-Type", "application/json").map_err(js_err)?;

        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("window".into()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        if !response.ok() {
            return Err(StoreError::Http {
                status: response.status(),
            });
        }

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        Ok(text.as_string().unwrap_or_default())
    }
}

impl LeaderboardStore for GistStore {
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let body = self.send("GET", None).await?;
        let entries = document::decode_gist(&body, &self.file_name)?;
        log::info!("Fetched {} leaderboard entries from gist", entries.len());
        Ok(entries)
    }

    async fn replace_all(&self, entries: Vec<LeaderboardEntry>) -> Result<(), StoreError> {
        let body = document::encode_gist_update(&self.file_name, &entries)?;
        self.send("PATCH", Some(body)).await?;
        log::info!("Leaderboard pushed to gist ({} entries)", entries.len());
        Ok(())
    }
}

/// Backend chosen from settings
#[derive(Debug, Clone)]
pub enum WebStore {
    Local(LocalStorageStore),
    Gist(GistStore),
}

impl WebStore {
    pub fn from_settings(settings: &StoreSettings) -> Self {
        match settings.backend {
            StoreBackend::Gist if settings.gist_ready() => WebStore::Gist(GistStore::new(
                settings.gist_id.clone(),
                settings.token.clone(),
                settings.file_name.clone(),
            )),
            _ => WebStore::Local(LocalStorageStore::default()),
        }
    }
}

impl LeaderboardStore for WebStore {
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        match self {
            WebStore::Local(store) => store.fetch_all().await,
            WebStore::Gist(store) => store.fetch_all().await,
        }
    }

    async fn replace_all(&self, entries: Vec<LeaderboardEntry>) -> Result<(), StoreError> {
        match self {
            WebStore::Local(store) => store.replace_all(entries).await,
            WebStore::Gist(store) => store.replace_all(entries).await,
        }
    }
}
