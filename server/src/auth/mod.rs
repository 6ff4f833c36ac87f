//! Accounts, credentials and bearer tokens.

mod extract;
mod password;
mod registration;
mod token;

pub use extract::{AuthUser, OptionalUser, bearer_token};
pub use password::{hash_password, verify_password};
pub use registration::{Registration, validate_registration};
pub use token::TokenService;

use std::sync::Arc;

use thiserror::Error;

use crate::store::{NewUser, Store, StoreError, UserRecord, UserStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid or expired token")]
    ExpiredToken,
    #[error("Invalid token")]
    UnknownUser,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A signed-in user together with a freshly issued token.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub fn register(&self, registration: Registration) -> Result<Session, AuthError> {
        let password_hash = hash_password(&registration.password)?;
        let user = self.store.create_user(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
        })?;
        let token = self.tokens.issue(&user.id)?;
        Ok(Session { token, user })
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        let user = self
            .store
            .find_user_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id)?;
        Ok(Session { token, user })
    }

    /// Resolves a bearer token to a user that still exists.
    pub fn authenticate(&self, token: &str) -> Result<UserRecord, AuthError> {
        let user_id = self.tokens.verify(token)?;
        self.store
            .find_user_by_id(&user_id)?
            .ok_or(AuthError::UnknownUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use std::time::Duration;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryStore::new()),
            TokenService::new("secret", Duration::from_secs(3600)),
        )
    }

    fn registration() -> Registration {
        Registration {
            username: "player1".to_string(),
            email: "player1@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_register_login_authenticate() {
        let auth = service();
        let registered = auth.register(registration()).unwrap();
        assert_ne!(registered.user.password_hash, "secret1");

        let session = auth.login("Player1@Example.com", "secret1").unwrap();
        assert_eq!(session.user.id, registered.user.id);

        let user = auth.authenticate(&session.token).unwrap();
        assert_eq!(user.username, "player1");
    }

    #[test]
    fn test_bad_credentials_look_the_same() {
        let auth = service();
        auth.register(registration()).unwrap();

        let wrong_password = auth.login("player1@example.com", "nope").unwrap_err();
        let wrong_email = auth.login("ghost@example.com", "secret1").unwrap_err();
        assert_eq!(wrong_password.to_string(), wrong_email.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_token_for_missing_user() {
        let auth = service();
        let tokens = TokenService::new("secret", Duration::from_secs(3600));
        let token = tokens.issue(&common::UserId::from("ghost")).unwrap();
        assert!(matches!(auth.authenticate(&token), Err(AuthError::UnknownUser)));
    }
}
