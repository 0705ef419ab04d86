//! Client session: at most one authenticated principal, persisted between runs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::{LoginRequest, NavItem, User, View};
use std::path::PathBuf;

use crate::auth::AuthService;

/// Key under which the session snapshot is persisted
pub const SNAPSHOT_KEY: &str = "tracker_user";

/// Key-value storage for serialized snapshots
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One JSON file per key
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// What gets persisted: the sanitized principal and its bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Initializing,
    Anonymous,
    Authenticated(SessionSnapshot),
}

pub struct SessionStore<S: SnapshotStore> {
    snapshots: S,
    state: SessionState,
}

impl<S: SnapshotStore> SessionStore<S> {
    pub fn new(snapshots: S) -> Self {
        Self {
            snapshots,
            state: SessionState::Initializing,
        }
    }

    /// Leave `Initializing` from whatever was persisted. Never fails: an
    /// unreadable or corrupt snapshot is dropped and the session is anonymous.
    pub fn restore(&mut self) {
        let raw = match self.snapshots.get(SNAPSHOT_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Discarding unreadable session snapshot: {}", e);
                if let Err(e) = self.snapshots.remove(SNAPSHOT_KEY) {
                    tracing::warn!("Could not remove session snapshot: {}", e);
                }
                None
            }
        };

        self.state = match raw.map(|raw| serde_json::from_str::<SessionSnapshot>(&raw)) {
            None => SessionState::Anonymous,
            Some(Ok(snapshot)) => {
                tracing::debug!("Restored session for {}", snapshot.user.email);
                SessionState::Authenticated(snapshot)
            }
            Some(Err(e)) => {
                tracing::warn!("Discarding corrupt session snapshot: {}", e);
                if let Err(e) = self.snapshots.remove(SNAPSHOT_KEY) {
                    tracing::warn!("Could not remove session snapshot: {}", e);
                }
                SessionState::Anonymous
            }
        };
    }

    /// Verify credentials and, on success, replace the current session.
    ///
    /// Returns `Ok(false)` when the credentials are rejected; the current state
    /// is then left untouched. Empty fields fail validation before any request.
    pub async fn login<A: AuthService>(&mut self, auth: &A, email: &str, password: &str) -> Result<bool> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        let Some(response) = auth.authenticate(&credentials).await? else {
            tracing::info!("Login rejected for {}", credentials.email);
            return Ok(false);
        };

        if let SessionState::Authenticated(previous) = &self.state {
            tracing::info!("Replacing session of {}", previous.user.email);
            if let Err(e) = auth.revoke(&previous.token).await {
                tracing::warn!("Could not revoke previous session: {}", e);
            }
        }

        let snapshot = SessionSnapshot {
            user: response.user,
            token: response.token,
        };
        self.snapshots
            .set(SNAPSHOT_KEY, &serde_json::to_string(&snapshot)?)?;
        tracing::info!("Logged in as {}", snapshot.user.email);
        self.state = SessionState::Authenticated(snapshot);
        Ok(true)
    }

    /// End the session. Calling it while anonymous is a no-op.
    pub async fn logout<A: AuthService>(&mut self, auth: &A) -> Result<()> {
        if let SessionState::Authenticated(snapshot) = &self.state {
            if let Err(e) = auth.revoke(&snapshot.token).await {
                tracing::warn!("Could not revoke server session: {}", e);
            }
        }
        self.discard()
    }

    /// Forget the session locally, without contacting the server
    pub fn discard(&mut self) -> Result<()> {
        self.snapshots.remove(SNAPSHOT_KEY)?;
        self.state = SessionState::Anonymous;
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(snapshot) => Some(&snapshot.user),
            SessionState::Initializing | SessionState::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(snapshot) => Some(&snapshot.token),
            SessionState::Initializing | SessionState::Anonymous => None,
        }
    }

    /// True until `restore` has run. A verification in flight is the pending
    /// `login` future, which holds the store exclusively.
    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Initializing
    }

    pub fn can_access(&self, view: View) -> bool {
        shared::can_access(self.current(), view)
    }

    pub fn resolve(&self, path: &str) -> View {
        shared::resolve(self.current(), path)
    }

    pub fn navigation(&self) -> Vec<NavItem> {
        shared::navigation(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::{LoginResponse, Role};
    use std::cell::RefCell;

    /// Roster-backed stand-in for the server
    struct StubAuth {
        roster: Vec<(&'static str, &'static str, User)>,
        calls: RefCell<usize>,
        revoked: RefCell<Vec<String>>,
    }

    fn user(id: &str, name: &str, email: &str, role: Role, is_active: bool) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            phone: Some("(11) 99999-9999".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_active,
        }
    }

    impl StubAuth {
        fn new() -> Self {
            Self {
                roster: vec![
                    (
                        "admin@rastreador.com",
                        "admin123",
                        user("1", "João Silva", "admin@rastreador.com", Role::Admin, true),
                    ),
                    (
                        "representante@rastreador.com",
                        "rep123",
                        user("2", "Maria Santos", "representante@rastreador.com", Role::Representative, true),
                    ),
                    (
                        "inativo@rastreador.com",
                        "old123",
                        user("9", "Ex Funcionário", "inativo@rastreador.com", Role::Technician, false),
                    ),
                ],
                calls: RefCell::new(0),
                revoked: RefCell::new(Vec::new()),
            }
        }
    }

    impl AuthService for StubAuth {
        async fn authenticate(&self, credentials: &LoginRequest) -> Result<Option<LoginResponse>> {
            *self.calls.borrow_mut() += 1;
            let calls = *self.calls.borrow();
            Ok(self
                .roster
                .iter()
                .find(|(email, password, user)| {
                    *email == credentials.email && *password == credentials.password && user.is_active
                })
                .map(|(_, _, user)| LoginResponse {
                    token: format!("token-{}-{}", user.id, calls),
                    user: user.clone(),
                }))
        }

        async fn revoke(&self, token: &str) -> Result<()> {
            self.revoked.borrow_mut().push(token.to_string());
            Ok(())
        }
    }

    fn restored(snapshots: MemorySnapshotStore) -> SessionStore<MemorySnapshotStore> {
        let mut store = SessionStore::new(snapshots);
        store.restore();
        store
    }

    #[test]
    fn test_starts_initializing_then_anonymous() {
        let mut store = SessionStore::new(MemorySnapshotStore::default());
        assert!(store.is_loading());
        assert_eq!(store.state(), &SessionState::Initializing);

        store.restore();
        assert!(!store.is_loading());
        assert_eq!(store.state(), &SessionState::Anonymous);
        assert!(store.can_access(View::Login));
        assert!(!store.can_access(View::Dashboard));
        assert_eq!(store.resolve("/reports"), View::Login);
        assert!(store.navigation().is_empty());
    }

    #[tokio::test]
    async fn test_admin_login_reaches_user_management() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());

        assert!(store.login(&auth, "admin@rastreador.com", "admin123").await.unwrap());
        let current = store.current().unwrap();
        assert_eq!(current.role, Role::Admin);
        assert!(store.can_access(View::Users));
        assert_eq!(store.resolve("/users"), View::Users);
        assert_eq!(store.navigation().len(), 4);

        let persisted = store.snapshots.get(SNAPSHOT_KEY).unwrap().unwrap();
        assert!(!persisted.contains("admin123"));
        assert!(!persisted.contains("password"));
    }

    #[tokio::test]
    async fn test_wrong_password_stays_anonymous() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());

        assert!(!store.login(&auth, "admin@rastreador.com", "wrong").await.unwrap());
        assert_eq!(store.state(), &SessionState::Anonymous);
        assert!(!store.is_loading());
        assert!(store.snapshots.get(SNAPSHOT_KEY).unwrap().is_none());

        assert!(!store.login(&auth, "inativo@rastreador.com", "old123").await.unwrap());
        assert!(!store.login(&auth, "nobody@rastreador.com", "admin123").await.unwrap());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_empty_fields_fail_before_verification() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());

        assert!(store.login(&auth, "", "admin123").await.is_err());
        assert!(store.login(&auth, "admin@rastreador.com", "").await.is_err());
        assert_eq!(*auth.calls.borrow(), 0);
        assert_eq!(store.state(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_reach_users() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());

        assert!(store.login(&auth, "representante@rastreador.com", "rep123").await.unwrap());
        assert!(store.can_access(View::Schedules));
        assert!(!store.can_access(View::Users));
        assert_eq!(store.resolve("/users"), View::NotFound);
        assert!(store.navigation().iter().all(|item| item.view != View::Users));
    }

    #[tokio::test]
    async fn test_snapshot_survives_restart() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());
        assert!(store.login(&auth, "representante@rastreador.com", "rep123").await.unwrap());
        let before = store.current().cloned();

        let reloaded = restored(store.snapshots.clone());
        assert_eq!(reloaded.current().cloned(), before);
        assert_eq!(reloaded.token(), store.token());
    }

    #[tokio::test]
    async fn test_logout_twice() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());
        assert!(store.login(&auth, "admin@rastreador.com", "admin123").await.unwrap());
        let token = store.token().unwrap().to_string();

        store.logout(&auth).await.unwrap();
        store.logout(&auth).await.unwrap();
        assert_eq!(store.state(), &SessionState::Anonymous);
        assert!(store.snapshots.get(SNAPSHOT_KEY).unwrap().is_none());
        assert_eq!(*auth.revoked.borrow(), vec![token]);
    }

    #[tokio::test]
    async fn test_relogin_replaces_session() {
        let auth = StubAuth::new();
        let mut store = restored(MemorySnapshotStore::default());
        assert!(store.login(&auth, "representante@rastreador.com", "rep123").await.unwrap());
        let first = store.token().unwrap().to_string();

        assert!(store.login(&auth, "admin@rastreador.com", "admin123").await.unwrap());
        assert_eq!(store.current().unwrap().id, "1");
        assert_eq!(*auth.revoked.borrow(), vec![first]);

        // A failed attempt keeps the admin session
        assert!(!store.login(&auth, "admin@rastreador.com", "wrong").await.unwrap());
        assert_eq!(store.current().unwrap().id, "1");
    }

    #[test]
    fn test_corrupt_snapshot_is_discarded() {
        let mut snapshots = MemorySnapshotStore::default();
        snapshots.set(SNAPSHOT_KEY, "{\"user\": 42").unwrap();

        let store = restored(snapshots);
        assert_eq!(store.state(), &SessionState::Anonymous);
        assert!(store.snapshots.get(SNAPSHOT_KEY).unwrap().is_none());
    }

    struct UnreachableAuth;

    impl AuthService for UnreachableAuth {
        async fn authenticate(&self, _credentials: &LoginRequest) -> Result<Option<LoginResponse>> {
            anyhow::bail!("Request failed: operation timed out")
        }

        async fn revoke(&self, _token: &str) -> Result<()> {
            anyhow::bail!("Request failed: operation timed out")
        }
    }

    #[tokio::test]
    async fn test_failed_verification_request_leaves_state() {
        let mut store = restored(MemorySnapshotStore::default());
        assert!(store
            .login(&UnreachableAuth, "admin@rastreador.com", "admin123")
            .await
            .is_err());
        assert!(!store.is_loading());
        assert_eq!(store.state(), &SessionState::Anonymous);

        let auth = StubAuth::new();
        assert!(store.login(&auth, "admin@rastreador.com", "admin123").await.unwrap());
        // Revocation failures do not block logout
        store.logout(&UnreachableAuth).await.unwrap();
        assert_eq!(store.state(), &SessionState::Anonymous);
    }

    #[test]
    fn test_unreadable_snapshot_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker_user.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let mut store = SessionStore::new(FileSnapshotStore::new(dir.path()));
        store.restore();
        assert_eq!(store.state(), &SessionState::Anonymous);
        assert!(!store.is_loading());
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = FileSnapshotStore::new(dir.path().join("data"));
        assert!(files.get(SNAPSHOT_KEY).unwrap().is_none());

        files.set(SNAPSHOT_KEY, "{}").unwrap();
        assert!(dir.path().join("data").join("tracker_user.json").exists());
        assert_eq!(files.get(SNAPSHOT_KEY).unwrap().as_deref(), Some("{}"));

        files.remove(SNAPSHOT_KEY).unwrap();
        files.remove(SNAPSHOT_KEY).unwrap();
        assert!(files.get(SNAPSHOT_KEY).unwrap().is_none());
    }
}
