use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::models::{PostModel, SaveModel, UserModel};
use crate::entities::{Page, Post, SavedPost, User};
use crate::repositories::{Document, DocumentList, Fields};
use crate::usecases::{Action, ApiError};

pub fn to_fields<T: Serialize>(action: Action, model: &T) -> Result<Fields, ApiError> {
    match serde_json::to_value(model) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(v) => Err(ApiError::Decode {
            action,
            message: format!("expected object, found: {}", v),
        }),
        Err(e) => Err(ApiError::Decode {
            action,
            message: e.to_string(),
        }),
    }
}

fn from_fields<T: DeserializeOwned>(action: Action, doc: &Document) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(doc.data.clone())).map_err(|e| ApiError::Decode {
        action,
        message: format!("document {}: {}", doc.id, e),
    })
}

pub fn decode_user(action: Action, doc: Document) -> Result<User, ApiError> {
    let UserModel {
        account_id,
        name,
        username,
        email,
        image_url,
        bio,
    } = from_fields(action, &doc)?;

    Ok(User {
        id: doc.id.into(),
        account_id,
        name,
        username,
        email,
        image_url,
        bio,
    })
}

pub fn decode_post(action: Action, doc: Document) -> Result<Post, ApiError> {
    let PostModel {
        creator,
        caption,
        image_url,
        image_id,
        location,
        tags,
        likes,
    } = from_fields(action, &doc)?;

    Ok(Post {
        id: doc.id.into(),
        creator,
        caption,
        image_url,
        image_id,
        location,
        tags,
        likes,
        created: doc.created_at,
        updated: doc.updated_at,
    })
}

pub fn decode_saved(action: Action, doc: Document) -> Result<SavedPost, ApiError> {
    let SaveModel { user, post } = from_fields(action, &doc)?;

    Ok(SavedPost {
        id: doc.id.into(),
        user,
        post,
    })
}

pub fn decode_page<T>(
    action: Action,
    list: DocumentList,
    decode: fn(Action, Document) -> Result<T, ApiError>,
) -> Result<Page<T>, ApiError> {
    let DocumentList { total, documents } = list;

    Ok(Page {
        total,
        items: documents
            .into_iter()
            .map(|d| decode(action, d))
            .collect::<Result<_, _>>()?,
    })
}
