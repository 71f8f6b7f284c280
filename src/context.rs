use std::sync::Arc;

use tokio::sync::RwLock;

use crate::controllers::account::AccountController;
use crate::controllers::QueryClient;
use crate::entities::User;
use crate::usecases::account::{create_account, sign_in, sign_out};
use crate::usecases::ApiError;

/// Who is signed in. Passed explicitly to whoever needs it.
pub struct AuthContext {
    account: Arc<AccountController>,
    queries: Arc<QueryClient>,
    user: RwLock<Option<User>>,
}

impl AuthContext {
    pub fn new(account: Arc<AccountController>, queries: Arc<QueryClient>) -> Self {
        Self {
            account,
            queries,
            user: RwLock::new(None),
        }
    }

    pub async fn user(&self) -> Option<User> { self.user.read().await.clone() }

    pub async fn is_authenticated(&self) -> bool { self.user.read().await.is_some() }

    /// Loads the signed-in user. A missing session or profile means signed
    /// out and is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn check_auth_user(&self) -> Result<bool, ApiError> {
        match self.account.current_user().await {
            Ok(current) => {
                *self.user.write().await = Some(current.user.clone());
                Ok(true)
            },
            Err(e) if e.is_unauthorized() || matches!(e, ApiError::Missing { .. }) => {
                tracing::debug!("signed out - {}", e);
                *self.user.write().await = None;
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Creates the account, opens a session for it and loads it.
    pub async fn sign_up(&self, data: create_account::Input) -> Result<bool, ApiError> {
        let credentials = sign_in::Input {
            email: data.email.clone(),
            password: data.password.clone(),
        };

        self.account.create_account.mutate(data).await?;

        self.sign_in(credentials).await
    }

    pub async fn sign_in(&self, data: sign_in::Input) -> Result<bool, ApiError> {
        self.account.sign_in.mutate(data).await?;

        // a previous user's data must not leak into the new session
        self.queries.clear().await;

        self.check_auth_user().await
    }

    /// Deletes the session, then forgets the user and every cached query.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.account.sign_out.mutate(sign_out::Input {}).await?;

        *self.user.write().await = None;
        self.queries.clear().await;

        Ok(())
    }
}
