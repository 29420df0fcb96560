use std::time::Duration;

use tictactoe_common::log;

use crate::game_service::GameService;

/// Periodically drops games whose client has gone quiet.
pub struct CleanupTask {
    game_service: GameService,
    check_interval: Duration,
    inactivity_timeout: Duration,
}

impl CleanupTask {
    pub fn new(
        game_service: GameService,
        check_interval: Duration,
        inactivity_timeout: Duration,
    ) -> Self {
        Self {
            game_service,
            check_interval,
            inactivity_timeout,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.cleanup_inactive().await;
        }
    }

    pub async fn cleanup_inactive(&self) -> usize {
        let inactive = self
            .game_service
            .store()
            .get_inactive(self.inactivity_timeout)
            .await;

        let mut removed = 0;
        for client_id in inactive {
            if self.game_service.end_session(&client_id).await {
                log!("[client:{}] Cleaning up inactive session", client_id);
                removed += 1;
            }
        }
        removed
    }
}
