//! UseCase: authenticate a connection attempt.
//!
//! The hard gate at handshake time: no room join or message flow can
//! happen for a connection this use case has not admitted.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{ChatStore, StoreError, User, UserId};
use crate::infrastructure::auth::TokenService;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication token is required")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("unknown user")]
    UnknownUser,

    #[error("store error during authentication: {0}")]
    Store(#[from] StoreError),
}

pub struct AuthenticateConnection {
    store: Arc<dyn ChatStore>,
    tokens: Arc<TokenService>,
}

impl AuthenticateConnection {
    pub fn new(store: Arc<dyn ChatStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Resolve a bearer token to a user, or refuse the connection.
    ///
    /// Fails on a missing token, a bad signature, an expired token, or a
    /// token whose embedded user id no longer resolves to a user.
    pub async fn execute(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("token verification failed: {}", e);
            AuthError::InvalidToken
        })?;
        let user_id = UserId::parse(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        self.store
            .find_user(&user_id)
            .await?
            .ok_or(AuthError::UnknownUser)
    }
}
