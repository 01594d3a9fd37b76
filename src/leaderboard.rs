//! Leaderboard: the fastest time for every score reached
//!
//! Not a top-N table. The board keeps at most one entry per distinct score,
//! and for each score the entry with the lowest elapsed time wins.

use serde::{Deserialize, Serialize};

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub score: u32,
    /// Seconds from round start to reaching `score`, tenths precision
    #[serde(rename = "time", with = "decimal_seconds")]
    pub elapsed_secs: f64,
}

impl LeaderboardEntry {
    pub fn new(player_name: impl Into<String>, score: u32, elapsed_secs: f64) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            elapsed_secs,
        }
    }
}

/// What `add_entry` did with a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First entry for this score
    Inserted,
    /// Beat the stored time for this score
    Replaced,
    /// Stored entry was as fast or faster
    Kept,
}

/// Best-time-per-score leaderboard, sorted by score descending then time ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary entries, merging duplicates by score
    pub fn from_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let mut board = Self::new();
        for entry in entries {
            board.add_entry(entry);
        }
        board
    }

    /// Merge one entry: insert if its score is new, replace only on a strictly lower time
    pub fn add_entry(&mut self, entry: LeaderboardEntry) -> MergeOutcome {
        let outcome = match self.entries.iter().position(|e| e.score == entry.score) {
            None => {
                self.entries.push(entry);
                MergeOutcome::Inserted
            }
            Some(i) if entry.elapsed_secs < self.entries[i].elapsed_secs => {
                self.entries[i] = entry;
                MergeOutcome::Replaced
            }
            Some(_) => MergeOutcome::Kept,
        };

        self.entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.elapsed_secs.total_cmp(&b.elapsed_secs))
        });

        outcome
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Stored entry for a given score
    pub fn best_for(&self, score: u32) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.score == score)
    }

    /// Number of pages; an empty board still has one (empty) page
    pub fn page_count(&self, page_size: usize) -> usize {
        let page_size = page_size.max(1);
        self.entries.len().div_ceil(page_size).max(1)
    }

    /// Clamp a page index into `[0, page_count - 1]`
    pub fn clamp_page(&self, page: usize, page_size: usize) -> usize {
        page.min(self.page_count(page_size) - 1)
    }

    /// Entries on one page
    pub fn page(&self, page: usize, page_size: usize) -> &[LeaderboardEntry] {
        let page_size = page_size.max(1);
        let start = self.clamp_page(page, page_size) * page_size;
        let end = (start + page_size).min(self.entries.len());
        &self.entries[start.min(end)..end]
    }
}

/// `time` is stored as a decimal string ("12.3"); older documents used numbers
mod decimal_seconds {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(secs: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.1}", secs))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    /// Times must be finite and non-negative; a NaN would never be beaten
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let secs = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid time value {s:?}")))?,
        };
        if !secs.is_finite() || secs < 0.0 {
            return Err(de::Error::custom(format!("time out of range: {secs}")));
        }
        Ok(secs)
    }
}
