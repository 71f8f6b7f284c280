use std::sync::Arc;

use async_trait::async_trait;

use super::converters::{decode_page, decode_user};
use super::*;
use crate::config::StringsConfig;
use crate::repositories::{DocumentStore, Query, CREATED_AT};
use crate::usecases::user::gets;
use crate::utils::AlsoChain;

pub struct UserGetsInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl gets::Usecase for UserGetsInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: gets::Input) -> Result<gets::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::GetUsers;

        let mut queries = vec![Query::order_desc(CREATED_AT)];
        if let Some(limit) = data.limit {
            queries.push(Query::limit(limit));
        }

        self.documents
            .list_documents(
                &self.config.database_id,
                &self.config.user_collection_id,
                &queries,
            )
            .await
            .map_err(remote_err(action))?
            .let_(|list| decode_page(action, list, decode_user))
            .map_err(logged)?
            .let_(|users| gets::Output { users })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}
