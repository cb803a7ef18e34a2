//! Identity collaborator contract.
//!
//! The upload session only needs a signed-in predicate; the remaining
//! operations exist for the outer layer (CLI) to drive sign-in and sign-out.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::User;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn is_signed_in(&self) -> bool;

    async fn sign_in(&self) -> Result<User, AppError>;

    async fn sign_out(&self);

    async fn get_user(&self) -> Result<User, AppError>;
}

/// Current user, with provider failures swallowed to `None`.
pub async fn current_user(provider: &dyn IdentityProvider) -> Option<User> {
    match provider.get_user().await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!(error = %e, "No current user");
            None
        }
    }
}

/// Process-local identity seeded from configuration.
pub struct LocalIdentity {
    username: Option<String>,
    user: RwLock<Option<User>>,
}

impl LocalIdentity {
    /// Identity that can sign in as `username`; starts signed out.
    pub fn new(username: Option<String>) -> Self {
        Self {
            username,
            user: RwLock::new(None),
        }
    }

    /// Identity already signed in as `username`.
    pub fn signed_in(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            user: RwLock::new(Some(User::new(username.clone()))),
            username: Some(username),
        }
    }

    /// Identity that is signed out and cannot sign in.
    pub fn anonymous() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn is_signed_in(&self) -> bool {
        self.user.read().map(|u| u.is_some()).unwrap_or(false)
    }

    async fn sign_in(&self) -> Result<User, AppError> {
        let username = self
            .username
            .clone()
            .ok_or_else(|| AppError::Unauthorized("No user configured; set SKETCHIFY_USER".to_string()))?;

        let mut guard = self
            .user
            .write()
            .map_err(|_| AppError::Internal("identity lock poisoned".to_string()))?;
        let user = guard.get_or_insert_with(|| User::new(username)).clone();
        tracing::info!(username = %user.username, "Signed in");
        Ok(user)
    }

    async fn sign_out(&self) {
        if let Ok(mut guard) = self.user.write() {
            if let Some(user) = guard.take() {
                tracing::info!(username = %user.username, "Signed out");
            }
        }
    }

    async fn get_user(&self) -> Result<User, AppError> {
        self.user
            .read()
            .map_err(|_| AppError::Internal("identity lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_and_out() {
        let identity = LocalIdentity::new(Some("ada".to_string()));
        assert!(!identity.is_signed_in());
        assert!(current_user(&identity).await.is_none());

        let user = identity.sign_in().await.unwrap();
        assert_eq!(user.username, "ada");
        assert!(identity.is_signed_in());
        assert_eq!(current_user(&identity).await, Some(user.clone()));

        // Signing in twice keeps the same user.
        assert_eq!(identity.sign_in().await.unwrap(), user);

        identity.sign_out().await;
        assert!(!identity.is_signed_in());
    }

    #[tokio::test]
    async fn anonymous_cannot_sign_in() {
        let identity = LocalIdentity::anonymous();
        assert!(matches!(
            identity.sign_in().await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(current_user(&identity).await.is_none());
    }

    #[test]
    fn signed_in_constructor() {
        assert!(LocalIdentity::signed_in("grace").is_signed_in());
    }
}
