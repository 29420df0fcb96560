use std::sync::Arc;

use tictactoe_common::games::SessionRng;
use tictactoe_common::games::tictactoe::{EngineError, GameSession, SharedStats};
use tictactoe_common::{ClientId, log};

use crate::api::{
    MoveRequest, MoveResponse, RestartResponse, StartRequest, StartResponse, StatsResponse,
};
use crate::server_config::ServerConfig;
use crate::session_store::SessionStore;

/// Runs engine work off the async workers; bot search on a 5x5 board can take a while.
async fn run_blocking<T, F>(task: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EngineError::InvariantViolation(format!("Engine task failed: {}", e)))?
}

#[derive(Debug, Clone)]
pub struct GameService {
    store: SessionStore,
    stats: SharedStats,
    config: Arc<ServerConfig>,
}

impl GameService {
    pub fn new(store: SessionStore, stats: SharedStats, config: ServerConfig) -> Self {
        Self {
            store,
            stats,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn new_rng(&self) -> SessionRng {
        match self.config.rng_seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        }
    }

    pub async fn start(
        &self,
        client_id: &ClientId,
        request: StartRequest,
    ) -> Result<StartResponse, EngineError> {
        let settings = request.settings();
        settings.validate(self.config.min_board_size, self.config.max_board_size)?;

        let rng = self.new_rng();
        let seed = rng.seed();
        let stats = self.stats.clone();
        let (session, opening) =
            run_blocking(move || GameSession::start(settings, rng, &stats)).await?;

        let response = StartResponse::new(session.board(), opening, self.stats.snapshot());
        self.store.insert(client_id.clone(), session).await;

        log!(
            "[client:{}] Game started: size={} win_length={} difficulty={} starter={:?} seed={}",
            client_id,
            settings.size,
            settings.win_length(),
            settings.difficulty.as_str(),
            settings.starting_player,
            seed
        );
        if let Some(ai_move) = opening {
            log!(
                "[client:{}] Bot opened at {} in {:.3}s",
                client_id,
                ai_move.position,
                ai_move.seconds
            );
        }

        Ok(response)
    }

    pub async fn make_move(
        &self,
        client_id: &ClientId,
        request: MoveRequest,
    ) -> Result<MoveResponse, EngineError> {
        let session = self.store.get(client_id).await.ok_or(EngineError::NoActiveSession)?;
        let guard = session.lock_owned().await;

        let position = request.position();
        let stats = self.stats.clone();
        let outcome = run_blocking(move || {
            let mut session = guard;
            session.apply_move(position, &stats)
        })
        .await?;

        if let Some(ai_move) = outcome.ai_move {
            log!(
                "[client:{}] Human played {}, bot replied {} in {:.3}s",
                client_id,
                position,
                ai_move.position,
                ai_move.seconds
            );
        } else {
            log!("[client:{}] Human played {}", client_id, position);
        }
        if outcome.status.is_terminal() {
            log!("[client:{}] Game over: {:?}", client_id, outcome.status);
        }

        MoveResponse::from_outcome(outcome).ok_or_else(|| {
            EngineError::InvariantViolation("Game continues without a bot reply".to_string())
        })
    }

    pub async fn restart(&self, client_id: &ClientId) -> Result<RestartResponse, EngineError> {
        let session = self.store.get(client_id).await.ok_or(EngineError::NoActiveSession)?;
        let guard = session.lock_owned().await;

        let stats = self.stats.clone();
        let response = run_blocking(move || {
            let mut session = guard;
            let opening = session.restart(&stats)?;
            Ok(RestartResponse::new(session.board(), opening))
        })
        .await?;

        log!("[client:{}] Game restarted", client_id);
        Ok(response)
    }

    pub fn stats(&self) -> StatsResponse {
        self.stats.snapshot().into()
    }

    /// Drops the client's game. Used by the idle-session sweep.
    pub async fn end_session(&self, client_id: &ClientId) -> bool {
        self.store.remove(client_id).await
    }
}
