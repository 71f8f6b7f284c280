use std::sync::Arc;

use super::*;
use crate::entities::{Page, User};
use crate::usecases::user::gets;
use crate::usecases::ApiError;

pub struct UserController {
    client: Arc<QueryClient>,
    gets: Arc<dyn gets::Usecase + Sync + Send>,
}

impl UserController {
    pub fn new(client: Arc<QueryClient>, gets: Arc<dyn gets::Usecase + Sync + Send>) -> Self {
        Self { client, gets }
    }

    pub async fn users(&self, limit: Option<u32>) -> Result<Arc<Page<User>>, ApiError> {
        let u = self.gets.clone();

        self.client
            .fetch(QueryKey::Users(limit), move || async move {
                u.handle(gets::Input { limit }).await.map(|o| o.users)
            })
            .await
    }
}
