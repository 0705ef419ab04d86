use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Server side of a login, named by the `sid` claim of its token
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Tracks which issued tokens are still valid so logout can revoke them
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn create_session(&self, user_id: &str, lifetime: Duration) -> SessionState {
        // Clean up expired sessions first
        let now = Utc::now();
        self.sessions.retain(|_, s| s.expires_at > now);

        let state = SessionState {
            session_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + lifetime,
        };
        self.sessions.insert(state.session_id, state.clone());
        tracing::info!("Session created: {} (user {})", state.session_id, user_id);
        state
    }

    pub fn is_active(&self, session_id: &Uuid) -> bool {
        self.sessions
            .get(session_id)
            .map(|s| s.expires_at > Utc::now())
            .unwrap_or(false)
    }

    /// Revoke a session. Revoking an unknown or already revoked session is a no-op.
    pub fn revoke(&self, session_id: &Uuid) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!("Session revoked: {}", session_id);
        }
        removed
    }

    pub fn get_session(&self, session_id: &Uuid) -> Option<SessionState> {
        self.sessions.get(session_id).map(|s| s.clone())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
