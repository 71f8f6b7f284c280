use anyhow::anyhow;
use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use mongodb::error::Result as MongoResult;
use serde_json::Value;

use super::models::MongoDocumentModel;
use super::super::{format_date, Document, Fields, RepositoryError, Result as RepoResult};
use crate::entities::Date;
use crate::utils::LetChain;

pub fn convert_repo_err<T, E>(result: Result<T, E>) -> RepoResult<T>
where E: Sync + Send + ::std::error::Error + 'static {
    result.map_err(|e| RepositoryError::Internal(anyhow!(e)))
}

pub fn try_unique_check<T>(result: MongoResult<T>) -> RepoResult<T> {
    let e = match result {
        Ok(t) => return Ok(t),
        Err(e) => e,
    };

    match *e.kind.clone() {
        ::mongodb::error::ErrorKind::Write(::mongodb::error::WriteFailure::WriteError(w))
            if w.code == 11000 =>
            Err(RepositoryError::Conflict),
        _ => Err(RepositoryError::Internal(anyhow!(e))),
    }
}

pub fn convert_404_or<T>(option: Option<T>) -> RepoResult<T> {
    match option {
        Some(t) => Ok(t),
        None => Err(RepositoryError::NotFound),
    }
}

pub fn to_bool<N>(number: N) -> bool
where N: ::core::convert::TryInto<i8> + ::core::fmt::Debug + Clone {
    match match ::core::convert::TryInto::<i8>::try_into(number.clone()) {
        Ok(n) => n,
        Err(_) => unreachable!("expected 0 or 1, found: {:?}", number),
    } {
        0 => false,
        1 => true,
        n => unreachable!("expected 0 or 1, found: {}", n),
    }
}

fn parse_date(raw: &str) -> RepoResult<Date> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Internal(anyhow!("broken timestamp {:?}: {}", raw, e)))
}

pub fn fields_to_bson(fields: &Fields) -> RepoResult<::mongodb::bson::Document> {
    ::mongodb::bson::to_document(fields).let_(convert_repo_err)
}

pub fn value_to_bson(value: &Value) -> RepoResult<Bson> {
    ::mongodb::bson::to_bson(value).let_(convert_repo_err)
}

pub fn new_model(id: &str, now: &Date, data: &Fields) -> RepoResult<MongoDocumentModel> {
    Ok(MongoDocumentModel {
        id: id.to_string(),
        created_at: format_date(now),
        updated_at: format_date(now),
        data: fields_to_bson(data)?,
    })
}

impl TryFrom<MongoDocumentModel> for Document {
    type Error = RepositoryError;

    fn try_from(
        MongoDocumentModel {
            id,
            created_at,
            updated_at,
            data,
        }: MongoDocumentModel,
    ) -> RepoResult<Self> {
        let data = match Bson::Document(data).into_relaxed_extjson() {
            Value::Object(m) => m,
            v => return Err(RepositoryError::Internal(anyhow!("expected object, found: {}", v))),
        };

        Ok(Document {
            id,
            created_at: parse_date(&created_at)?,
            updated_at: parse_date(&updated_at)?,
            data,
        })
    }
}
