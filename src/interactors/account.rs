use std::sync::Arc;

use async_trait::async_trait;

use super::converters::{decode_saved, decode_user, to_fields};
use super::models::UserModel;
use super::*;
use crate::config::StringsConfig;
use crate::entities::CurrentUser;
use crate::repositories::{unique_id, DocumentStore, IdentityService, Query};
use crate::usecases::account::{create_account, get_current_user, sign_in, sign_out};
use crate::utils::AlsoChain;

/// Saved records loaded with the current user.
const SAVED_LIMIT: u32 = 100;

pub struct CreateAccountInteractor {
    pub identity: Arc<dyn IdentityService + Sync + Send>,
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl create_account::Usecase for CreateAccountInteractor {
    #[tracing::instrument(skip(self, data), fields(email = %data.email))]
    async fn handle(&self, data: create_account::Input) -> Result<create_account::Output, ApiError> {
        let action = Action::CreateAccount;
        let create_account::Input {
            name,
            username,
            email,
            password,
        } = data;

        let account = self
            .identity
            .create_account(&email, &password, &name)
            .await
            .map_err(remote_err(action))?;

        let image_url = self.identity.initials_avatar(&account.name);
        let model = UserModel {
            account_id: account.id.clone(),
            name: account.name,
            username,
            email: account.email,
            image_url,
            bio: None,
        };

        let fields = to_fields(action, &model).map_err(logged)?;

        // the identity record stays when this fails: the identity service
        // offers no way to remove it
        let doc = self
            .documents
            .create_document(
                &self.config.database_id,
                &self.config.user_collection_id,
                &unique_id(),
                fields,
            )
            .await
            .map_err(|e| {
                tracing::warn!("account {} left without a profile", account.id);
                remote_err(action)(e)
            })?;

        decode_user(action, doc)
            .map_err(logged)?
            .let_(|user| create_account::Output { user })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct SignInInteractor {
    pub identity: Arc<dyn IdentityService + Sync + Send>,
}
#[async_trait]
impl sign_in::Usecase for SignInInteractor {
    #[tracing::instrument(skip(self, data), fields(email = %data.email))]
    async fn handle(&self, data: sign_in::Input) -> Result<sign_in::Output, ApiError> {
        let sign_in::Input { email, password } = data;

        self.identity
            .create_session(&email, &password)
            .await
            .map_err(remote_err(Action::SignIn))?
            .let_(|session| sign_in::Output { session })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct SignOutInteractor {
    pub identity: Arc<dyn IdentityService + Sync + Send>,
}
#[async_trait]
impl sign_out::Usecase for SignOutInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: sign_out::Input) -> Result<sign_out::Output, ApiError> {
        tracing::trace!("input - {:?}", data);

        self.identity
            .delete_session("current")
            .await
            .map_err(remote_err(Action::SignOut))?;

        Ok(sign_out::Output {})
    }
}

pub struct GetCurrentUserInteractor {
    pub identity: Arc<dyn IdentityService + Sync + Send>,
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl get_current_user::Usecase for GetCurrentUserInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(
        &self,
        data: get_current_user::Input,
    ) -> Result<get_current_user::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::GetCurrentUser;

        let account = match self.identity.get_account().await {
            Ok(a) => a,
            // logged out is an ordinary state, not worth an error line
            Err(e @ crate::repositories::RepositoryError::Unauthorized) =>
                return Err(ApiError::remote(action)(e)),
            Err(e) => return Err(remote_err(action)(e)),
        };

        let user = self
            .documents
            .list_documents(
                &self.config.database_id,
                &self.config.user_collection_id,
                &[Query::equal("accountId", account.id.as_str())],
            )
            .await
            .map_err(remote_err(action))?
            .documents
            .into_iter()
            .next()
            .ok_or(ApiError::Missing {
                action,
                what: "profile",
            })
            .map_err(logged)?
            .let_(|doc| decode_user(action, doc))
            .map_err(logged)?;

        let saved = self
            .documents
            .list_documents(
                &self.config.database_id,
                &self.config.saves_collection_id,
                &[
                    Query::equal("user", user.id.as_str()),
                    Query::limit(SAVED_LIMIT),
                ],
            )
            .await
            .map_err(remote_err(action))?
            .documents
            .into_iter()
            .map(|d| decode_saved(action, d))
            .collect::<Result<Vec<_>, _>>()
            .map_err(logged)?;

        get_current_user::Output {
            current: CurrentUser { user, saved },
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}
