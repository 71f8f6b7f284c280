use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($( $n:ident ),* $(,)?) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $n(pub String);

            impl $n {
                pub fn as_str(&self) -> &str { &self.0 }

                pub fn is_empty(&self) -> bool { self.0.is_empty() }
            }

            impl From<String> for $n {
                fn from(s: String) -> Self { Self(s) }
            }

            impl From<&str> for $n {
                fn from(s: &str) -> Self { Self(s.to_string()) }
            }

            impl ::core::fmt::Display for $n {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

id_type!(UserId, AccountId, PostId, FileId, SaveId);

pub type Date = DateTime<Utc>;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub account_id: AccountId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub creator: UserId,
    pub caption: String,
    pub image_url: String,
    pub image_id: FileId,
    pub location: String,
    pub tags: Vec<String>,
    pub likes: Vec<UserId>,
    pub created: Date,
    pub updated: Date,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &UserId) -> bool { self.likes.contains(user_id) }

    /// Likes list after `user_id` toggles their like.
    pub fn toggled_likes(&self, user_id: &UserId) -> Vec<UserId> {
        match self.is_liked_by(user_id) {
            true => self
                .likes
                .iter()
                .filter(|id| *id != user_id)
                .cloned()
                .collect(),
            false => {
                let mut likes = self.likes.clone();
                likes.push(user_id.clone());
                likes
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedPost {
    pub id: SaveId,
    pub user: UserId,
    pub post: PostId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub account_id: AccountId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub user: User,
    pub saved: Vec<SavedPost>,
}

impl CurrentUser {
    pub fn saved_record(&self, post_id: &PostId) -> Option<&SavedPost> {
        self.saved.iter().find(|s| &s.post == post_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: u64,
    pub items: Vec<T>,
}

/// A file picked for upload.
#[derive(Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ::core::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Splits a comma separated tag string. Every space is removed first, so
/// `"a, b ,c"` gives `["a", "b", "c"]`.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let stripped = raw.replace(' ', "");

    match stripped.is_empty() {
        true => vec![],
        false => stripped.split(',').map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_strip_spaces_and_keep_order() {
        assert_eq!(parse_tags("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_tags("rust,async"), vec!["rust", "async"]);
    }

    #[test]
    fn tags_empty_input() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags("   ").is_empty());
    }

    #[test]
    fn tags_no_dedup() {
        assert_eq!(parse_tags("a,a"), vec!["a", "a"]);
        assert_eq!(parse_tags("a,,b"), vec!["a", "", "b"]);
    }

    fn post(likes: &[&str]) -> Post {
        Post {
            id: "p1".into(),
            creator: "u1".into(),
            caption: "caption".to_string(),
            image_url: "url".to_string(),
            image_id: "f1".into(),
            location: "here".to_string(),
            tags: vec![],
            likes: likes.iter().map(|s| UserId::from(*s)).collect(),
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn toggled_likes_adds_and_removes() {
        let me = UserId::from("me");

        assert_eq!(post(&["a"]).toggled_likes(&me), vec!["a".into(), me.clone()]);
        assert_eq!(post(&["a", "me"]).toggled_likes(&me), vec![UserId::from("a")]);
    }
}
