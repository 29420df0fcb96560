use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::types::{Mark, round_seconds};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    HumanWin,
    AiWin,
    Draw,
}

impl GameResult {
    pub fn from_winner(winner: Option<Mark>) -> Self {
        match winner {
            Some(Mark::X) => GameResult::HumanWin,
            Some(Mark::O) => GameResult::AiWin,
            _ => GameResult::Draw,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatsAggregate {
    pub human_wins: u32,
    pub ai_wins: u32,
    pub draws: u32,
    pub ai_times: Vec<f64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub human_wins: u32,
    pub ai_wins: u32,
    pub draws: u32,
    pub games: u32,
    pub average_ai_time: f64,
}

impl StatsAggregate {
    pub fn record_outcome(&mut self, result: GameResult) {
        match result {
            GameResult::HumanWin => self.human_wins += 1,
            GameResult::AiWin => self.ai_wins += 1,
            GameResult::Draw => self.draws += 1,
        }
    }

    pub fn record_ai_latency(&mut self, seconds: f64) {
        self.ai_times.push(seconds);
    }

    pub fn games(&self) -> u32 {
        self.human_wins + self.ai_wins + self.draws
    }

    pub fn average_ai_time(&self) -> f64 {
        if self.ai_times.is_empty() {
            return 0.0;
        }
        round_seconds(self.ai_times.iter().sum::<f64>() / self.ai_times.len() as f64)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            human_wins: self.human_wins,
            ai_wins: self.ai_wins,
            draws: self.draws,
            games: self.games(),
            average_ai_time: self.average_ai_time(),
        }
    }
}

/// Cloneable handle to one aggregate shared by every session that reports to it.
#[derive(Debug, Default, Clone)]
pub struct SharedStats {
    inner: Arc<Mutex<StatsAggregate>>,
}

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the counters half-written.
    fn lock(&self) -> MutexGuard<'_, StatsAggregate> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_outcome(&self, result: GameResult) {
        self.lock().record_outcome(result);
    }

    pub fn record_ai_latency(&self, seconds: f64) {
        self.lock().record_ai_latency(seconds);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().snapshot()
    }
}
