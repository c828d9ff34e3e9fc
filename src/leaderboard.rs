//! Leaderboard collaborator
//!
//! The game only needs an append/query store: insert one entry per finished
//! session and read the top entries back ordered by score. Nicknames are
//! unique; a duplicate gets one retry with a themed suffix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionSummary;

/// Rows returned by the leaderboard view
pub const DEFAULT_QUERY_LIMIT: usize = 50;
/// Entries kept by a store; lower scores fall off the end
pub const MAX_ENTRIES: usize = 100;
/// Longest accepted nickname (in characters)
pub const MAX_NICKNAME_LEN: usize = 20;
/// Suffixes offered when a nickname is taken
pub const NICKNAME_SUFFIXES: [&str; 5] = ["Recycler", "Eco", "Green", "Leaf", "Solar"];

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub nickname: String,
    pub highest_score: u64,
    pub games_played: u32,
    /// Unix timestamp (ms) of the submission
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeaderboardError {
    #[error("nickname `{0}` is already taken")]
    Conflict(String),
    #[error("invalid nickname: {0}")]
    InvalidNickname(&'static str),
    #[error("leaderboard unavailable: {0}")]
    Backend(String),
}

impl LeaderboardError {
    /// Worth offering a "try again" to the player
    pub fn is_retryable(&self) -> bool {
        matches!(self, LeaderboardError::Backend(_))
    }
}

/// Append/query score store
pub trait LeaderboardStore {
    /// Add an entry; fails with `Conflict` if the nickname exists
    fn insert(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError>;

    /// Up to `limit` entries, highest score first
    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

/// In-process store, kept sorted by score (descending) and capped at [`MAX_ENTRIES`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLeaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive nickname lookup
    pub fn contains(&self, nickname: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.nickname.eq_ignore_ascii_case(nickname))
    }

    /// Rank (1-indexed) a score would take if submitted now
    pub fn potential_rank(&self, score: u64) -> usize {
        self.entries
            .iter()
            .position(|e| score > e.highest_score)
            .unwrap_or(self.entries.len())
            + 1
    }

    /// Rank (1-indexed) of a stored nickname
    pub fn rank_of(&self, nickname: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.nickname.eq_ignore_ascii_case(nickname))
            .map(|i| i + 1)
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn insert(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        if self.contains(&entry.nickname) {
            return Err(LeaderboardError::Conflict(entry.nickname));
        }
        // Ties keep submission order
        let pos = self
            .entries
            .iter()
            .position(|e| entry.highest_score > e.highest_score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }
}

/// Browser-local leaderboard persisted to LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard {
    inner: MemoryLeaderboard,
}

#[cfg(target_arch = "wasm32")]
impl LocalLeaderboard {
    const STORAGE_KEY: &'static str = "green_dino_leaderboard";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    /// Load from LocalStorage, starting empty if missing or unreadable
    pub fn load() -> Self {
        let inner = Self::storage()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|json| serde_json::from_str::<MemoryLeaderboard>(&json).ok());

        match inner {
            Some(inner) => {
                log::info!("Loaded {} leaderboard entries", inner.len());
                Self { inner }
            }
            None => {
                log::info!("No leaderboard found, starting fresh");
                Self::default()
            }
        }
    }

    fn save(&self) -> Result<(), LeaderboardError> {
        let storage = Self::storage()
            .ok_or_else(|| LeaderboardError::Backend("local storage unavailable".into()))?;
        let json = serde_json::to_string(&self.inner)
            .map_err(|e| LeaderboardError::Backend(e.to_string()))?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| LeaderboardError::Backend("failed to write local storage".into()))?;
        log::info!("Leaderboard saved ({} entries)", self.inner.len());
        Ok(())
    }

    /// Read access for ranking queries
    pub fn board(&self) -> &MemoryLeaderboard {
        &self.inner
    }
}

#[cfg(target_arch = "wasm32")]
impl LeaderboardStore for LocalLeaderboard {
    fn insert(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        let mut next = self.inner.clone();
        next.insert(entry)?;
        let previous = std::mem::replace(&mut self.inner, next);
        if let Err(e) = self.save() {
            self.inner = previous;
            return Err(e);
        }
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.inner.top(limit)
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Nickname the entry was stored under
    pub nickname: String,
    /// True if the requested nickname was taken and a suggestion was used
    pub renamed: bool,
}

/// Trim and check a player-entered nickname
pub fn validate_nickname(raw: &str) -> Result<String, LeaderboardError> {
    let nickname = raw.trim();
    if nickname.is_empty() {
        return Err(LeaderboardError::InvalidNickname("nickname is empty"));
    }
    if nickname.chars().count() > MAX_NICKNAME_LEN {
        return Err(LeaderboardError::InvalidNickname("nickname is too long"));
    }
    if nickname.chars().any(char::is_control) {
        return Err(LeaderboardError::InvalidNickname(
            "nickname contains control characters",
        ));
    }
    Ok(nickname.to_string())
}

/// Alternative nickname with a themed suffix, kept within the length limit
pub fn suggest_nickname(nickname: &str) -> String {
    let pick = nickname.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize));
    let suffix = NICKNAME_SUFFIXES[pick % NICKNAME_SUFFIXES.len()];
    let room = MAX_NICKNAME_LEN.saturating_sub(suffix.chars().count());
    let base: String = nickname.chars().take(room).collect();
    format!("{base}{suffix}")
}

/// Submit a finished session's best round, retrying once with a suggested
/// nickname on conflict
pub fn submit_session<S: LeaderboardStore + ?Sized>(
    store: &mut S,
    nickname: &str,
    summary: &SessionSummary,
    timestamp: f64,
) -> Result<Submission, LeaderboardError> {
    let nickname = validate_nickname(nickname)?;
    let entry = |nickname: String| LeaderboardEntry {
        nickname,
        highest_score: summary.best_score,
        games_played: summary.rounds_played,
        timestamp,
    };

    match store.insert(entry(nickname.clone())) {
        Ok(()) => {
            log::info!("Submitted {} points as {}", summary.best_score, nickname);
            Ok(Submission {
                nickname,
                renamed: false,
            })
        }
        Err(LeaderboardError::Conflict(_)) => {
            let alternative = suggest_nickname(&nickname);
            log::info!("Nickname {} taken, retrying as {}", nickname, alternative);
            store.insert(entry(alternative.clone()))?;
            Ok(Submission {
                nickname: alternative,
                renamed: true,
            })
        }
        Err(e) => {
            log::warn!("Leaderboard submission failed: {}", e);
            Err(e)
        }
    }
}

/// Medal for the podium, `#n` below it
pub fn rank_label(index: usize) -> String {
    match index {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        _ => format!("#{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{COMPLETION_CODE, ScoreAggregate};
    use crate::sim::Collection;

    fn summary(score: u64) -> SessionSummary {
        SessionSummary {
            round_scores: vec![score, 0, 0],
            aggregate: ScoreAggregate::Max,
            score,
            best_score: score,
            rounds_played: 3,
            collected: Collection::default(),
            completion_code: COMPLETION_CODE.to_string(),
        }
    }

    fn entry(nickname: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            nickname: nickname.to_string(),
            highest_score: score,
            games_played: 3,
            timestamp: 0.0,
        }
    }

    /// Store whose backend is down
    struct Offline;

    impl LeaderboardStore for Offline {
        fn insert(&mut self, _entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Backend("connection refused".into()))
        }

        fn top(&self, _limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            Err(LeaderboardError::Backend("connection refused".into()))
        }
    }

    #[test]
    fn test_entries_sorted_descending() {
        let mut board = MemoryLeaderboard::new();
        board.insert(entry("ann", 120)).unwrap();
        board.insert(entry("bob", 300)).unwrap();
        board.insert(entry("cy", 200)).unwrap();

        let scores: Vec<u64> = board.top(10).unwrap().iter().map(|e| e.highest_score).collect();
        assert_eq!(scores, vec![300, 200, 120]);
        assert_eq!(board.top(2).unwrap().len(), 2);
        assert_eq!(board.rank_of("cy"), Some(2));
    }

    #[test]
    fn test_potential_rank() {
        let mut board = MemoryLeaderboard::new();
        assert_eq!(board.potential_rank(10), 1);
        board.insert(entry("ann", 100)).unwrap();
        assert_eq!(board.potential_rank(150), 1);
        assert_eq!(board.potential_rank(50), 2);
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = MemoryLeaderboard::new();
        for i in 0..(MAX_ENTRIES as u64 + 50) {
            board.insert(entry(&format!("p{i}"), i)).unwrap();
        }
        assert_eq!(board.len(), MAX_ENTRIES);
        // The lowest scores were dropped
        assert!(!board.contains("p0"));
        assert_eq!(board.rank_of(&format!("p{}", MAX_ENTRIES + 49)), Some(1));
        assert_eq!(board.top(DEFAULT_QUERY_LIMIT).unwrap().len(), DEFAULT_QUERY_LIMIT);
    }

    #[test]
    fn test_submit_stores_best_round_not_total() {
        let summary = SessionSummary {
            round_scores: vec![10, 20, 30],
            aggregate: ScoreAggregate::Sum,
            score: 60,
            best_score: 30,
            rounds_played: 3,
            collected: Collection::default(),
            completion_code: COMPLETION_CODE.to_string(),
        };
        let mut board = MemoryLeaderboard::new();
        submit_session(&mut board, "Ada", &summary, 1.0).unwrap();

        let top = board.top(1).unwrap();
        assert_eq!(top[0].highest_score, 30);
        assert_eq!(top[0].games_played, 3);
    }

    #[test]
    fn test_duplicate_nickname_conflicts() {
        let mut board = MemoryLeaderboard::new();
        board.insert(entry("Dino", 10)).unwrap();
        assert_eq!(
            board.insert(entry("dino", 20)),
            Err(LeaderboardError::Conflict("dino".into()))
        );
    }

    #[test]
    fn test_submit_retries_with_suggestion() {
        let mut board = MemoryLeaderboard::new();
        board.insert(entry("Rex", 10)).unwrap();

        let submission = submit_session(&mut board, "  Rex ", &summary(420), 1.0).unwrap();
        assert!(submission.renamed);
        assert_eq!(submission.nickname, suggest_nickname("Rex"));
        assert_eq!(board.rank_of(&submission.nickname), Some(1));
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_submit_gives_up_after_one_retry() {
        let mut board = MemoryLeaderboard::new();
        board.insert(entry("Rex", 10)).unwrap();
        board.insert(entry(&suggest_nickname("Rex"), 10)).unwrap();

        let err = submit_session(&mut board, "Rex", &summary(5), 1.0).unwrap_err();
        assert!(matches!(err, LeaderboardError::Conflict(_)));
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_backend_failure_is_retryable() {
        let err = submit_session(&mut Offline, "Rex", &summary(5), 1.0).unwrap_err();
        assert!(err.is_retryable());
        assert!(Offline.top(5).is_err());
    }

    #[test]
    fn test_nickname_validation() {
        assert_eq!(validate_nickname(" Ada ").unwrap(), "Ada");
        assert!(validate_nickname("   ").is_err());
        assert!(validate_nickname(&"x".repeat(MAX_NICKNAME_LEN + 1)).is_err());
        assert!(validate_nickname("a\tb").is_err());
        assert!(!LeaderboardError::InvalidNickname("x").is_retryable());
    }

    #[test]
    fn test_suggestion_fits_limit() {
        let long = "x".repeat(MAX_NICKNAME_LEN);
        let suggestion = suggest_nickname(&long);
        assert_eq!(suggestion.chars().count(), MAX_NICKNAME_LEN);
        assert_ne!(suggestion, long);
        assert!(NICKNAME_SUFFIXES.iter().any(|s| suggestion.ends_with(s)));
    }

    #[test]
    fn test_rank_labels() {
        assert_eq!(rank_label(0), "🥇");
        assert_eq!(rank_label(2), "🥉");
        assert_eq!(rank_label(3), "#4");
    }
}
