//! Credential verification, token issuing and the authenticated-user extractor.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;
use jsonwebtoken::{encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{can_access, User, View};
use uuid::Uuid;

use crate::{config::AuthConfig, error::AppError, repo::RosterEntry, state::AppState};

/// Message for every failed login; never says which part was wrong
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub sid: Uuid,   // server-side session
    pub iat: usize,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn password_matches(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Find the active principal matching `email` and `password`.
///
/// Scans the roster in order and stops at the first entry whose email and
/// password both match. Unknown emails, wrong passwords and inactive accounts
/// all yield `None`.
pub fn verify_credentials(roster: &[RosterEntry], email: &str, password: &str) -> Option<User> {
    let entry = roster
        .iter()
        .find(|entry| entry.login == email && password_matches(password, &entry.password_hash))?;

    if !entry.user.is_active {
        tracing::info!("Login refused for inactive user {}", entry.user.id);
        return None;
    }
    Some(entry.user.clone())
}

pub fn generate_token(user_id: &str, session_id: Uuid, auth_config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::hours(auth_config.token_expiry_hours as i64))
        .ok_or_else(|| AppError::Internal("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id,
        iat: now.timestamp() as usize,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth_config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::AuthError(e.to_string()))
}

/// The principal behind a request's bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session_id: Uuid,
}

impl AuthUser {
    /// Refuse the request unless the principal may reach `view`
    pub fn require(&self, view: View) -> Result<(), AppError> {
        if can_access(Some(&self.user), view) {
            Ok(())
        } else {
            tracing::debug!("User {} denied access to {:?}", self.user.id, view);
            Err(AppError::Forbidden(format!("Access to {} is not allowed", view.path())))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::AuthError("Missing or invalid Authorization header".to_string()))?;

        let claims = verify_token(bearer.token(), &state.config.auth.jwt_secret)?;
        if !state.sessions.is_active(&claims.sid) {
            return Err(AppError::AuthError("Session has ended".to_string()));
        }

        let user = state
            .repo
            .get_user(&claims.sub)
            .await
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::AuthError("Unknown or inactive user".to_string()))?;

        Ok(AuthUser {
            user,
            session_id: claims.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::seed;

    fn roster() -> Vec<RosterEntry> {
        let users = seed::users();
        seed::SEED_LOGINS
            .iter()
            .map(|(login, id, password)| RosterEntry {
                login: login.to_string(),
                user: users.iter().find(|u| u.id == *id).cloned().unwrap(),
                password_hash: hash_password(password).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_verify_known_credentials() {
        let roster = roster();
        let user = verify_credentials(&roster, "admin@rastreador.com", "admin123").unwrap();
        assert_eq!(user.id, "1");
        assert!(user.is_admin());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_reject_unknown_or_wrong_credentials() {
        let roster = roster();
        assert!(verify_credentials(&roster, "admin@rastreador.com", "wrong").is_none());
        assert!(verify_credentials(&roster, "nobody@rastreador.com", "admin123").is_none());
        assert!(verify_credentials(&roster, "ADMIN@rastreador.com", "admin123").is_none());
        assert!(verify_credentials(&roster, "representante@rastreador.com", "admin123").is_none());
    }

    #[test]
    fn test_technician_demo_login() {
        let roster = roster();
        let user = verify_credentials(&roster, "tecnico@rastreador.com", "tec123").unwrap();
        assert_eq!(user.id, "3");
        assert_eq!(user.name, "Carlos Oliveira");

        assert!(verify_credentials(&roster, "tecnico1@rastreador.com", "tec123").is_none());
        assert!(verify_credentials(&roster, "tecnico2@rastreador.com", "tec123").is_none());
    }

    #[test]
    fn test_inactive_user_cannot_log_in() {
        let mut roster = roster();
        roster[1].user.is_active = false;
        assert!(verify_credentials(&roster, "representante@rastreador.com", "rep123").is_none());
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let mut roster = roster();
        roster[0].password_hash = "admin123".to_string();
        assert!(verify_credentials(&roster, "admin@rastreador.com", "admin123").is_none());
    }

    #[test]
    fn test_token_round_trip() {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_expiry_hours: 1,
        };
        let sid = Uuid::new_v4();
        let token = generate_token("3", sid, &config).unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "3");
        assert_eq!(claims.sid, sid);
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
