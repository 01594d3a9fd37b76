//! Leaderboard JSON document and the gist envelope around it

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::StoreError;
use crate::leaderboard::LeaderboardEntry;

/// Serialize the full leaderboard document
pub fn encode(entries: &[LeaderboardEntry]) -> Result<String, StoreError> {
    serde_json::to_string(entries).map_err(StoreError::Encode)
}

/// Parse a leaderboard document; a blank document is an empty board
pub fn decode(document: &str) -> Result<Vec<LeaderboardEntry>, StoreError> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(document).map_err(StoreError::Decode)
}

#[derive(Debug, Serialize, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Gist {
    #[serde(default)]
    files: BTreeMap<String, GistFile>,
}

/// Pull the leaderboard out of a `GET /gists/{id}` response body.
/// A gist without the file yields an empty board.
pub fn decode_gist(body: &str, file_name: &str) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let gist: Gist = serde_json::from_str(body).map_err(StoreError::Decode)?;
    match gist.files.get(file_name).and_then(|f| f.content.as_deref()) {
        Some(content) => decode(content),
        None => Ok(Vec::new()),
    }
}

/// Body for `PATCH /gists/{id}` replacing the leaderboard file
pub fn encode_gist_update(
    file_name: &str,
    entries: &[LeaderboardEntry],
) -> Result<String, StoreError> {
    let mut files = BTreeMap::new();
    files.insert(
        file_name.to_string(),
        GistFile {
            content: Some(encode(entries)?),
        },
    );
    serde_json::to_string(&Gist { files }).map_err(StoreError::Encode)
}
