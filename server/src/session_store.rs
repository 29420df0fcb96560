use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tictactoe_common::ClientId;
use tictactoe_common::games::tictactoe::GameSession;
use tokio::sync::Mutex;

pub type SharedSession = Arc<Mutex<GameSession>>;

#[derive(Debug)]
struct SessionEntry {
    session: SharedSession,
    last_activity: Instant,
}

/// Active games keyed by client. The map lock is only held for lookups; each game has its own lock.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<ClientId, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `session` for the client, replacing any earlier game.
    pub async fn insert(&self, client_id: ClientId, session: GameSession) -> SharedSession {
        let shared = Arc::new(Mutex::new(session));
        let entry = SessionEntry {
            session: shared.clone(),
            last_activity: Instant::now(),
        };
        self.sessions.lock().await.insert(client_id, entry);
        shared
    }

    /// Looks up the client's game and marks it as active.
    pub async fn get(&self, client_id: &ClientId) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(client_id)?;
        entry.last_activity = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn remove(&self, client_id: &ClientId) -> bool {
        self.sessions.lock().await.remove(client_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get_inactive(&self, timeout: Duration) -> Vec<ClientId> {
        let now = Instant::now();
        self.sessions
            .lock()
            .await
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_activity) >= timeout)
            .map(|(client_id, _)| client_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_common::games::SessionRng;
    use tictactoe_common::games::tictactoe::{GameSettings, SharedStats};

    fn new_session() -> GameSession {
        let stats = SharedStats::new();
        let (session, _) =
            GameSession::start(GameSettings::default(), SessionRng::new(1), &stats).unwrap();
        session
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = SessionStore::new();
        let client = ClientId::from("alice");

        assert!(store.get(&client).await.is_none());

        store.insert(client.clone(), new_session()).await;

        assert!(store.get(&client).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clients_are_isolated() {
        let store = SessionStore::new();
        let alice = ClientId::from("alice");
        let bob = ClientId::from("bob");

        store.insert(alice.clone(), new_session()).await;

        assert!(store.get(&bob).await.is_none());
        assert!(store.remove(&alice).await);
        assert!(!store.remove(&alice).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_insert_replaces_existing_game() {
        let store = SessionStore::new();
        let client = ClientId::from("alice");

        let first = store.insert(client.clone(), new_session()).await;
        let second = store.insert(client.clone(), new_session()).await;
        let current = store.get(&client).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &current));
        assert!(Arc::ptr_eq(&second, &current));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_inactive() {
        let store = SessionStore::new();
        store.insert(ClientId::from("alice"), new_session()).await;

        assert!(store.get_inactive(Duration::from_secs(3600)).await.is_empty());
        assert_eq!(store.get_inactive(Duration::ZERO).await, vec![ClientId::from("alice")]);
    }
}
