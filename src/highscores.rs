//! Best score and high score leaderboard
//!
//! Persisted to the key-value store, tracks the top 10 named scores.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LEADERBOARD_ENTRIES, MAX_NAME_LEN};
use crate::persistence::{SharedStore, keys, load_json, save_json};

/// Name used when the submitted one is empty after sanitizing
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Human readable date, derived from `timestamp`
    #[serde(default)]
    pub date: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Aggregate numbers over the stored entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeaderboardStats {
    pub total_games: usize,
    pub average_score: u64,
    pub best_score: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary entries, restoring the sort/cap invariant
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.normalize();
        board
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
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Check if a score would make the board
    pub fn is_top_score(&self, score: u64) -> bool {
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// 1 + number of entries strictly better than `score`
    pub fn rank_of(&self, score: u64) -> usize {
        1 + self.entries.iter().filter(|e| e.score > score).count()
    }

    /// Insert an entry, then re-sort and truncate.
    /// Returns the entry's rank (1-indexed) if it survived the cut.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        // Stable sort places the newcomer after every existing tie
        let position = self
            .entries
            .iter()
            .filter(|e| e.score >= entry.score)
            .count();
        self.entries.push(entry);
        self.normalize();
        (position < MAX_LEADERBOARD_ENTRIES).then_some(position + 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> LeaderboardStats {
        if self.entries.is_empty() {
            return LeaderboardStats::default();
        }
        let total: u64 = self.entries.iter().map(|e| e.score).sum();
        let count = self.entries.len();
        LeaderboardStats {
            total_games: count,
            average_score: (total as f64 / count as f64).round() as u64,
            best_score: self.top_score().unwrap_or(0),
        }
    }

    // Stable sort keeps earlier entries ahead of later ties
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
    }
}

/// Clean a player name for display and storage
///
/// Strips markup tags and stray markup characters, trims, caps the length,
/// and substitutes a placeholder when nothing is left.
pub fn sanitize_name(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '>' | '&' | '"' | '\'' | '`' => {}
            c if c.is_control() => {}
            c => stripped.push(c),
        }
    }

    let name: String = stripped.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

/// Format a timestamp (ms since the Unix epoch) as a calendar date
pub fn format_date(timestamp: f64) -> String {
    if !timestamp.is_finite() {
        return String::new();
    }
    chrono::DateTime::from_timestamp_millis(timestamp as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Best score + leaderboard, persisted on every change
pub struct ScoreBook {
    best: u64,
    leaderboard: Leaderboard,
    store: SharedStore,
}

impl ScoreBook {
    /// Load best score and leaderboard. Corrupt data starts fresh.
    pub fn load(store: SharedStore) -> Self {
        let best = match store.get(keys::BEST_SCORE) {
            Ok(Some(raw)) => raw.trim().trim_matches('"').parse::<u64>().unwrap_or_else(|e| {
                log::warn!("Corrupt best score {:?}: {}", raw, e);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Failed to load best score: {}", e);
                0
            }
        };

        let leaderboard = load_json::<Vec<LeaderboardEntry>>(&*store, keys::LEADERBOARD)
            .map(Leaderboard::from_entries)
            .unwrap_or_default();

        log::info!(
            "Loaded best score {} and {} leaderboard entries",
            best,
            leaderboard.len()
        );

        Self {
            best,
            leaderboard,
            store,
        }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Raise the best score if `score` beats it. Returns true on a new best.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        self.save_best();
        true
    }

    /// Add a named score to the leaderboard and persist it.
    /// Returns the rank if the entry made the cut.
    pub fn submit(&mut self, name: &str, score: u64, timestamp: f64) -> Option<usize> {
        let entry = LeaderboardEntry {
            name: sanitize_name(name),
            score,
            date: format_date(timestamp),
            timestamp,
        };
        log::info!("Leaderboard submit: {} - {}", entry.name, score);
        let rank = self.leaderboard.insert(entry);
        self.save_leaderboard();
        rank
    }

    pub fn is_top_score(&self, score: u64) -> bool {
        self.leaderboard.is_top_score(score)
    }

    pub fn rank_of(&self, score: u64) -> usize {
        self.leaderboard.rank_of(score)
    }

    /// Explicitly reset the best score to 0
    pub fn reset_best(&mut self) {
        self.best = 0;
        self.save_best();
    }

    pub fn clear_leaderboard(&mut self) {
        self.leaderboard.clear();
        self.save_leaderboard();
    }

    fn save_best(&self) {
        if let Err(e) = self.store.set(keys::BEST_SCORE, &self.best.to_string()) {
            log::warn!("Failed to save best score: {}", e);
        }
    }

    fn save_leaderboard(&self) {
        if save_json(&*self.store, keys::LEADERBOARD, &self.leaderboard) {
            log::debug!("Leaderboard saved ({} entries)", self.leaderboard.len());
        }
    }
}
