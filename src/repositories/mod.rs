use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{Account, Date, FileId, Session, UploadFile};

pub mod mock;
pub mod mongo;

type Result<T> = ::std::result::Result<T, RepositoryError>;

pub type Fields = ::serde_json::Map<String, Value>;

/// Document attribute holding the id.
pub const ID: &str = "$id";
/// Document attribute holding the creation time.
pub const CREATED_AT: &str = "$createdAt";
/// Document attribute holding the last modification time.
pub const UPDATED_AT: &str = "$updatedAt";

pub const DEFAULT_LIST_LIMIT: u32 = 25;

/// Identity service: accounts and sessions.
#[async_trait]
pub trait IdentityService {
    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<Account>;

    async fn create_session(&self, email: &str, password: &str) -> Result<Session>;

    /// Account owning the active session.
    async fn get_account(&self) -> Result<Account>;

    /// `"current"` deletes the active session.
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Avatar URL rendering the initials of `name`.
    fn initials_avatar(&self, name: &str) -> String;
}

/// Schema-light document database.
#[async_trait]
pub trait DocumentStore {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Fields,
    ) -> Result<Document>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList>;

    /// Overwrites the given fields, keeping the others.
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Fields,
    ) -> Result<Document>;

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()>;
}

/// Blob storage with on-the-fly image previews.
#[async_trait]
pub trait FileStore {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: UploadFile,
    ) -> Result<StoredFile>;

    async fn file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<String>;

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub created_at: Date,
    pub updated_at: Date,
    pub data: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: FileId,
    pub bucket_id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Value),
    /// Case-insensitive match of a term inside a string attribute.
    Search(String, String),
    OrderDesc(String),
    OrderAsc(String),
    Limit(u32),
    /// Continue after the document with this id.
    CursorAfter(String),
}

impl Query {
    pub fn equal(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal(attr.into(), value.into())
    }

    pub fn search(attr: impl Into<String>, term: impl Into<String>) -> Self {
        Self::Search(attr.into(), term.into())
    }

    pub fn order_desc(attr: impl Into<String>) -> Self { Self::OrderDesc(attr.into()) }

    pub fn order_asc(attr: impl Into<String>) -> Self { Self::OrderAsc(attr.into()) }

    pub fn limit(n: u32) -> Self { Self::Limit(n) }

    pub fn cursor_after(id: impl Into<String>) -> Self { Self::CursorAfter(id.into()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl Gravity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::Top => "top",
            Gravity::Bottom => "bottom",
            Gravity::Left => "left",
            Gravity::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    pub width: u32,
    pub height: u32,
    pub gravity: Gravity,
    pub quality: u8,
}

impl PreviewOptions {
    /// Preview used for post images.
    pub const POST_IMAGE: PreviewOptions = PreviewOptions {
        width: 2000,
        height: 2000,
        gravity: Gravity::Top,
        quality: 100,
    };
}

/// Fixed-width UTC timestamp; sorts the same as the instant it encodes.
pub fn format_date(date: &Date) -> String {
    date.to_rfc3339_opts(::chrono::SecondsFormat::Micros, true)
}

/// Fresh id for a document, file or account.
pub fn unique_id() -> String { ::uuid::Uuid::new_v4().simple().to_string() }

#[derive(Debug, ::thiserror::Error)]
pub enum RepositoryError {
    #[error("cannot find object.")]
    NotFound,
    #[error("expected unique object, found non-unique objects (matched: {matched})")]
    NoUnique { matched: u32 },
    #[error("object already exists.")]
    Conflict,
    #[error("no active session.")]
    Unauthorized,
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}
