//! CLI authentication: credential verification against the server, and the
//! login/logout/whoami commands.

use anyhow::Result;
use shared::{LoginRequest, LoginResponse};

use crate::api::{ApiClient, ApiError};
use crate::session::{SessionStore, SnapshotStore};

/// Message shown for every rejected login, whatever the cause
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Verifies credentials and ends server-side sessions
pub trait AuthService {
    /// `Ok(None)` when the credentials are rejected
    async fn authenticate(&self, credentials: &LoginRequest) -> Result<Option<LoginResponse>>;

    async fn revoke(&self, token: &str) -> Result<()>;
}

pub struct HttpAuthService {
    api: ApiClient,
}

impl HttpAuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl AuthService for HttpAuthService {
    async fn authenticate(&self, credentials: &LoginRequest) -> Result<Option<LoginResponse>> {
        Ok(self.api.login(credentials).await?)
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        match self.api.with_token(token).logout().await {
            // Already expired or revoked
            Ok(()) | Err(ApiError::Unauthorized(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub async fn login<S: SnapshotStore, A: AuthService>(
    session: &mut SessionStore<S>,
    auth: &A,
    email: &str,
    password: &str,
) -> Result<()> {
    if session.login(auth, email, password).await? {
        if let Some(user) = session.current() {
            println!("\x1b[1;32m✅ Login successful!\x1b[0m");
            println!("Welcome, {} ({})", user.name, user.role.label());
        }
    } else {
        eprintln!("\x1b[31m✗ {}\x1b[0m", INVALID_CREDENTIALS);
    }
    Ok(())
}

pub async fn logout<S: SnapshotStore, A: AuthService>(session: &mut SessionStore<S>, auth: &A) -> Result<()> {
    session.logout(auth).await?;
    println!("\x1b[32m✅ Logged out successfully\x1b[0m");
    Ok(())
}

/// Show the current principal, confirmed with the server
pub async fn whoami<S: SnapshotStore>(session: &SessionStore<S>, api: &ApiClient) -> Result<()> {
    match (session.current(), session.token()) {
        (Some(user), Some(token)) => {
            let user = match api.with_token(token).me().await {
                Ok(fresh) => fresh,
                Err(e @ ApiError::Unauthorized(_)) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Could not reach server: {}", e);
                    user.clone()
                }
            };
            println!("\x1b[32m✓ Logged in\x1b[0m");
            println!("[{}] {} <{}>", user.initials(), user.name, user.email);
            println!("Role: {}", user.role.label());
            println!("Server: {}", api.base_url());
        }
        _ => {
            println!("\x1b[33m✗ Not logged in\x1b[0m");
            println!("Run '\x1b[1mtracker login\x1b[0m' to authenticate");
        }
    }
    Ok(())
}
