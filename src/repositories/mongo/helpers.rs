use mongodb::bson::doc;
use mongodb::error::Result as MongoResult;
use mongodb::{Collection, Database};
use tracing::Instrument;

use super::converters::{convert_404_or, convert_repo_err};
use super::models::MongoDocumentModel;
use super::super::Result as RepoResult;
use crate::utils::LetChain;

pub async fn initialize_coll(
    coll_name: impl Into<::mongodb::bson::Bson>,
    db: &Database,
) -> MongoResult<()> {
    db.run_command(
        doc! {
            "createIndexes": coll_name.into(),
            "indexes": [{
                "name": "unique_id",
                "key": {
                    "id": 1
                },
                "unique": true
            }],
        },
        None,
    )
    .instrument(tracing::trace_span!("run_command"))
    .await?;

    Ok(())
}

pub async fn get_one(
    coll: &Collection<MongoDocumentModel>,
    id: impl Into<::mongodb::bson::Bson>,
) -> RepoResult<MongoDocumentModel> {
    let res = coll
        .find_one(doc! { "id": id.into() }, None)
        .instrument(tracing::trace_span!("find_one"))
        .await
        .let_(convert_repo_err)?
        .let_(convert_404_or)?;

    Ok(res)
}
