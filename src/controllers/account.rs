use std::sync::Arc;

use super::*;
use crate::entities::CurrentUser;
use crate::usecases::account::{create_account, get_current_user, sign_in, sign_out};
use crate::usecases::{Action, ApiError};

pub struct AccountController {
    client: Arc<QueryClient>,

    get_current_user: Arc<dyn get_current_user::Usecase + Sync + Send>,

    pub create_account: Mutation<create_account::Input, create_account::Output>,
    pub sign_in: Mutation<sign_in::Input, sign_in::Output>,
    pub sign_out: Mutation<sign_out::Input, sign_out::Output>,
}

impl AccountController {
    pub fn new(
        client: Arc<QueryClient>,
        create_account: Arc<dyn create_account::Usecase + Sync + Send>,
        sign_in: Arc<dyn sign_in::Usecase + Sync + Send>,
        sign_out: Arc<dyn sign_out::Usecase + Sync + Send>,
        get_current_user: Arc<dyn get_current_user::Usecase + Sync + Send>,
    ) -> Self {
        Self {
            create_account: mutation!(
                client.clone(),
                Action::CreateAccount,
                create_account => create_account,
                |_| vec![]
            ),
            sign_in: mutation!(client.clone(), Action::SignIn, sign_in => sign_in, |_| vec![]),
            sign_out: mutation!(client.clone(), Action::SignOut, sign_out => sign_out, |_| vec![]),

            get_current_user,
            client,
        }
    }

    pub async fn current_user(&self) -> Result<Arc<CurrentUser>, ApiError> {
        let u = self.get_current_user.clone();

        self.client
            .fetch(QueryKey::CurrentUser, move || async move {
                u.handle(get_current_user::Input {}).await.map(|o| o.current)
            })
            .await
    }

    pub fn queries(&self) -> &Arc<QueryClient> { &self.client }
}
