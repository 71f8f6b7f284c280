use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Client, Collection};
use tokio::sync::Mutex;
use tracing::Instrument;

use super::{
    format_date, Document, DocumentList, DocumentStore, Fields, Query, RepositoryError, Result,
};
use crate::utils::LetChain;

mod converters;
mod helpers;
mod models;
mod type_convert;

use converters::{
    convert_404_or, convert_repo_err, fields_to_bson, new_model, to_bool, try_unique_check,
};
use helpers::{get_one, initialize_coll};
use models::MongoDocumentModel;
use type_convert::{lookup, ListPlan};

/// Document store on MongoDB: a database id names a MongoDB database and a
/// collection id names a collection in it.
pub struct MongoDocumentStore {
    client: Client,
    initialized: Mutex<HashSet<(String, String)>>,
}

impl MongoDocumentStore {
    pub async fn new_with_uri(uri_str: impl AsRef<str>) -> ::anyhow::Result<Self> {
        let client = Client::with_uri_str(uri_str).await?;

        Ok(Self::new_with(client))
    }

    pub fn new_with(client: Client) -> Self {
        Self {
            client,
            initialized: Mutex::new(HashSet::new()),
        }
    }

    async fn coll(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<Collection<MongoDocumentModel>> {
        let db = self.client.database(database_id);
        let key = (database_id.to_string(), collection_id.to_string());

        let mut guard = self.initialized.lock().await;
        if !guard.contains(&key) {
            initialize_coll(collection_id, &db)
                .await
                .let_(convert_repo_err)?;
            guard.insert(key);
        }

        Ok(db.collection(collection_id))
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    #[tracing::instrument(skip(self, data))]
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Fields,
    ) -> Result<Document> {
        let coll = self.coll(database_id, collection_id).await?;
        let model = new_model(document_id, &Utc::now(), &data)?;

        coll.insert_one(model.clone(), None)
            .instrument(tracing::trace_span!("insert_one"))
            .await
            .let_(try_unique_check)?;

        model.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document> {
        let coll = self.coll(database_id, collection_id).await?;

        get_one(&coll, document_id).await?.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let coll = self.coll(database_id, collection_id).await?;
        let plan = ListPlan::new(queries)?;

        let total = coll
            .count_documents(plan.filter.clone(), None)
            .instrument(tracing::trace_span!("count_documents"))
            .await
            .let_(convert_repo_err)?;

        let filter = match &plan.cursor {
            None => plan.filter.clone(),
            Some(cursor) => {
                let anchor = match coll
                    .clone_with_type::<::mongodb::bson::Document>()
                    .find_one(doc! { "id": cursor.as_str() }, None)
                    .instrument(tracing::trace_span!("find_one"))
                    .await
                    .let_(convert_repo_err)?
                {
                    Some(d) => d,
                    None =>
                        return Err(RepositoryError::Invalid(format!(
                            "cursor document not found: {}",
                            cursor
                        ))),
                };
                let values = plan
                    .orders
                    .iter()
                    .map(|(field, _)| lookup(&anchor, field))
                    .collect::<Vec<_>>();

                doc! { "$and": [plan.filter.clone(), plan.after(&values)] }
            },
        };

        let options = FindOptions::builder()
            .sort(plan.sort())
            .limit(plan.limit)
            .build();
        let documents = coll
            .find(filter, options)
            .instrument(tracing::trace_span!("find"))
            .await
            .let_(convert_repo_err)?
            .try_collect::<Vec<_>>()
            .await
            .let_(convert_repo_err)?
            .into_iter()
            .map(Document::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(DocumentList { total, documents })
    }

    #[tracing::instrument(skip(self, data))]
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Fields,
    ) -> Result<Document> {
        let coll = self.coll(database_id, collection_id).await?;

        let mut set = doc! { "updated_at": format_date(&Utc::now()) };
        for (k, v) in fields_to_bson(&data)? {
            set.insert(format!("data.{}", k), v);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        coll.find_one_and_update(doc! { "id": document_id }, doc! { "$set": set }, options)
            .instrument(tracing::trace_span!("find_one_and_update"))
            .await
            .let_(convert_repo_err)?
            .let_(convert_404_or)?
            .try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        let coll = self.coll(database_id, collection_id).await?;

        let res = coll
            .delete_one(doc! { "id": document_id }, None)
            .instrument(tracing::trace_span!("delete_one"))
            .await
            .let_(convert_repo_err)?;

        match res.deleted_count.let_(to_bool) {
            true => Ok(()),
            false => Err(RepositoryError::NotFound),
        }
    }
}
