//! Three-round session controller
//!
//! A session plays exactly `ROUNDS_PER_SESSION` episodes back to back. Each
//! finished episode contributes its final score to the round list; once all
//! rounds are recorded the session produces a [`SessionSummary`] that can be
//! shown locally and submitted to a leaderboard.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::ROUNDS_PER_SESSION;
use crate::sim::{Collection, EpisodeState, StepOutcome, TickInput, tick};
use crate::tuning::Rules;

/// Code revealed after the final round
pub const COMPLETION_CODE: &str = "5555";

/// How round scores combine into the session score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoreAggregate {
    /// Total of all rounds
    Sum,
    /// Best single round
    #[default]
    Max,
}

impl ScoreAggregate {
    pub fn apply(&self, scores: &[u64]) -> u64 {
        match self {
            ScoreAggregate::Sum => scores.iter().fold(0u64, |acc, s| acc.saturating_add(*s)),
            ScoreAggregate::Max => scores.iter().copied().max().unwrap_or(0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreAggregate::Sum => "sum",
            ScoreAggregate::Max => "max",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("round {0} is still in progress")]
    RoundInProgress(usize),
    #[error("all rounds of the session have been played")]
    Complete,
    #[error("no round is in progress")]
    NoRound,
}

/// Results of a completed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Final score of each round, in play order
    pub round_scores: Vec<u64>,
    pub aggregate: ScoreAggregate,
    /// Round scores combined with `aggregate`
    pub score: u64,
    pub best_score: u64,
    pub rounds_played: u32,
    /// Distinct rewards collected over all rounds
    pub collected: Collection,
    pub completion_code: String,
}

/// Drives the rounds of one session
#[derive(Debug, Clone)]
pub struct Session {
    seed: u64,
    rules: Rules,
    aggregate: ScoreAggregate,
    rng: Pcg32,
    round_scores: Vec<u64>,
    collected: Collection,
    current: Option<EpisodeState>,
}

impl Session {
    pub fn new(seed: u64, rules: Rules, aggregate: ScoreAggregate) -> Self {
        Self {
            seed,
            rules,
            aggregate,
            rng: Pcg32::seed_from_u64(seed),
            round_scores: Vec::with_capacity(ROUNDS_PER_SESSION),
            collected: Collection::default(),
            current: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Begin the next round
    pub fn start_round(&mut self) -> Result<&EpisodeState, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Complete);
        }
        if self.round_in_progress() {
            return Err(SessionError::RoundInProgress(self.current_round()));
        }
        log::info!(
            "Starting round {} of {}",
            self.round_scores.len() + 1,
            ROUNDS_PER_SESSION
        );
        Ok(self.current.insert(EpisodeState::new(self.rules.clone())))
    }

    /// Throw away the running round and start it over without using up a round
    pub fn restart_round(&mut self) -> Result<&EpisodeState, SessionError> {
        if !self.round_in_progress() {
            return Err(SessionError::NoRound);
        }
        log::info!("Restarting round {}", self.current_round());
        Ok(self.current.insert(EpisodeState::new(self.rules.clone())))
    }

    /// Advance the running round; records the score when it ends
    pub fn tick(&mut self, input: &TickInput) -> StepOutcome {
        let Some(episode) = self.current.as_mut() else {
            return StepOutcome::Inactive;
        };
        let outcome = tick(episode, input, &mut self.rng);
        if outcome.ended() {
            self.round_scores.push(episode.score);
            for kind in episode.inventory.as_slice() {
                self.collected.insert(*kind);
            }
            log::info!(
                "Round {} finished with {} points",
                self.round_scores.len(),
                episode.score
            );
            if self.is_complete() {
                log::info!(
                    "Session complete: {:?} ({} = {})",
                    self.round_scores,
                    self.aggregate.as_str(),
                    self.aggregate.apply(&self.round_scores)
                );
            }
        }
        outcome
    }

    /// Tear down the running round (view closed); nothing is recorded
    pub fn abandon(&mut self) -> bool {
        match self.current.take() {
            Some(episode) if episode.running => {
                log::info!("Round {} abandoned", self.round_scores.len() + 1);
                true
            }
            _ => false,
        }
    }

    /// Episode of the current (or just finished) round
    pub fn episode(&self) -> Option<&EpisodeState> {
        self.current.as_ref()
    }

    pub fn episode_mut(&mut self) -> Option<&mut EpisodeState> {
        self.current.as_mut()
    }

    pub fn round_in_progress(&self) -> bool {
        self.current.as_ref().is_some_and(|e| e.running)
    }

    /// 1-based number of the round being played, or the next one
    pub fn current_round(&self) -> usize {
        if self.round_in_progress() {
            self.round_scores.len() + 1
        } else {
            (self.round_scores.len() + 1).min(ROUNDS_PER_SESSION)
        }
    }

    pub fn round_scores(&self) -> &[u64] {
        &self.round_scores
    }

    pub fn rounds_remaining(&self) -> usize {
        ROUNDS_PER_SESSION - self.round_scores.len()
    }

    pub fn is_complete(&self) -> bool {
        self.round_scores.len() >= ROUNDS_PER_SESSION
    }

    /// Summary once every round has been recorded
    pub fn summary(&self) -> Option<SessionSummary> {
        if !self.is_complete() {
            return None;
        }
        Some(SessionSummary {
            round_scores: self.round_scores.clone(),
            aggregate: self.aggregate,
            score: self.aggregate.apply(&self.round_scores),
            best_score: ScoreAggregate::Max.apply(&self.round_scores),
            rounds_played: self.round_scores.len() as u32,
            collected: self.collected.clone(),
            completion_code: COMPLETION_CODE.to_string(),
        })
    }
}
