use serde::{Deserialize, Serialize};

use crate::entities::{AccountId, FileId, PostId, UserId};

/// Fields of a profile document in the users collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub account_id: AccountId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Fields of a document in the posts collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostModel {
    pub creator: UserId,
    pub caption: String,
    pub image_url: String,
    pub image_id: FileId,
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: Vec<UserId>,
}

/// Fields an edit overwrites; creator and likes stay as they are.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEditModel {
    pub caption: String,
    pub image_url: String,
    pub image_id: FileId,
    pub location: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostLikesModel {
    pub likes: Vec<UserId>,
}

/// Fields of a document in the saves collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveModel {
    pub user: UserId,
    pub post: PostId,
}
