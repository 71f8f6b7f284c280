use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use super::{
    unique_id, Document, DocumentList, DocumentStore, Fields, FileStore, IdentityService,
    PreviewOptions, Query, RepositoryError, Result, StoredFile,
};
use crate::entities::{Account, AccountId, Session, UploadFile};

mod helpers;

use helpers::{apply_queries, find_mut, find_ref, initials_avatar_url, position, preview_url};

/// Operation of an in-memory service that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAccount,
    CreateSession,
    GetAccount,
    DeleteSession,
    CreateDocument,
    GetDocument,
    ListDocuments,
    UpdateDocument,
    DeleteDocument,
    CreateFile,
    FilePreview,
    DeleteFile,
}

/// Failure injection and call counting shared by the in-memory services.
#[derive(Debug, Default)]
struct Faults {
    failing: std::sync::Mutex<HashSet<Operation>>,
    calls: AtomicUsize,
}

impl Faults {
    fn enter(&self, op: Operation) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing
            .lock()
            .map_err(|e| RepositoryError::Internal(anyhow!("poisoned: {}", e)))?;

        match failing.contains(&op) {
            true => Err(RepositoryError::Internal(anyhow!("injected failure: {:?}", op))),
            false => Ok(()),
        }
    }

    fn set(&self, op: Operation, fail: bool) {
        if let Ok(mut failing) = self.failing.lock() {
            match fail {
                true => failing.insert(op),
                false => failing.remove(&op),
            };
        }
    }
}

macro_rules! fault_controls {
    ($t:ty) => {
        impl $t {
            /// Makes every later `op` call fail with an internal error.
            pub fn fail_on(&self, op: Operation) { self.faults.set(op, true) }

            pub fn recover(&self, op: Operation) { self.faults.set(op, false) }

            /// Number of calls received so far, failed ones included.
            pub fn calls(&self) -> usize { self.faults.calls.load(Ordering::SeqCst) }
        }
    };
}

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_digest: String,
}

#[derive(Debug, Default)]
struct IdentityState {
    accounts: Vec<StoredAccount>,
    sessions: Vec<Session>,
    current: Option<String>,
}

pub struct InMemoryIdentity {
    endpoint: String,
    project: String,
    state: Mutex<IdentityState>,
    faults: Faults,
}

impl InMemoryIdentity {
    pub fn new(endpoint: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            project: project.into(),
            state: Mutex::new(IdentityState::default()),
            faults: Faults::default(),
        }
    }
}

fault_controls!(InMemoryIdentity);

fn digest(password: &str) -> String { format!("{:x}", Sha256::digest(password.as_bytes())) }

#[async_trait]
impl IdentityService for InMemoryIdentity {
    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<Account> {
        self.faults.enter(Operation::CreateAccount)?;
        let mut guard = self.state.lock().await;

        if guard.accounts.iter().any(|a| a.account.email == email) {
            return Err(RepositoryError::Conflict);
        }

        let account = Account {
            id: AccountId(unique_id()),
            name: name.to_string(),
            email: email.to_string(),
        };
        guard.accounts.push(StoredAccount {
            account: account.clone(),
            password_digest: digest(password),
        });

        Ok(account)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session> {
        self.faults.enter(Operation::CreateSession)?;
        let mut guard = self.state.lock().await;

        let account_id = match find_ref(&guard.accounts, |a| a.account.email == email) {
            Ok(a) if a.password_digest == digest(password) => a.account.id.clone(),
            Ok(_) | Err(RepositoryError::NotFound) => return Err(RepositoryError::Unauthorized),
            Err(e) => return Err(e),
        };

        let session = Session {
            id: unique_id(),
            account_id,
        };
        guard.current = Some(session.id.clone());
        guard.sessions.push(session.clone());

        Ok(session)
    }

    async fn get_account(&self) -> Result<Account> {
        self.faults.enter(Operation::GetAccount)?;
        let guard = self.state.lock().await;

        let current = guard.current.as_ref().ok_or(RepositoryError::Unauthorized)?;
        let session = find_ref(&guard.sessions, |s| &s.id == current)?;
        let stored = find_ref(&guard.accounts, |a| a.account.id == session.account_id)?;

        Ok(stored.account.clone())
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.faults.enter(Operation::DeleteSession)?;
        let mut guard = self.state.lock().await;

        let target = match session_id {
            "current" => guard.current.clone().ok_or(RepositoryError::Unauthorized)?,
            id => id.to_string(),
        };
        let index = position(&guard.sessions, |s| s.id == target)?;
        guard.sessions.remove(index);

        if guard.current.as_deref() == Some(target.as_str()) {
            guard.current = None;
        }

        Ok(())
    }

    fn initials_avatar(&self, name: &str) -> String {
        initials_avatar_url(&self.endpoint, &self.project, name)
    }
}

pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<(String, String), Vec<Document>>>,
    faults: Faults,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            faults: Faults::default(),
        }
    }

    /// Number of documents stored in a collection.
    pub async fn count(&self, database_id: &str, collection_id: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(&(database_id.to_string(), collection_id.to_string()))
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self { Self::new() }
}

fault_controls!(InMemoryDocumentStore);

fn coll_key(database_id: &str, collection_id: &str) -> (String, String) {
    (database_id.to_string(), collection_id.to_string())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Fields,
    ) -> Result<Document> {
        self.faults.enter(Operation::CreateDocument)?;
        let mut guard = self.collections.lock().await;
        let coll = guard.entry(coll_key(database_id, collection_id)).or_default();

        if coll.iter().any(|d| d.id == document_id) {
            return Err(RepositoryError::Conflict);
        }

        let now = Utc::now();
        let doc = Document {
            id: document_id.to_string(),
            created_at: now,
            updated_at: now,
            data,
        };
        coll.push(doc.clone());

        Ok(doc)
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document> {
        self.faults.enter(Operation::GetDocument)?;
        let guard = self.collections.lock().await;
        let coll = guard
            .get(&coll_key(database_id, collection_id))
            .ok_or(RepositoryError::NotFound)?;

        Ok(find_ref(coll, |d| d.id == document_id)?.clone())
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        self.faults.enter(Operation::ListDocuments)?;
        let guard = self.collections.lock().await;
        let docs = guard
            .get(&coll_key(database_id, collection_id))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let (total, documents) = apply_queries(docs, queries)?;

        Ok(DocumentList { total, documents })
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Fields,
    ) -> Result<Document> {
        self.faults.enter(Operation::UpdateDocument)?;
        let mut guard = self.collections.lock().await;
        let coll = guard
            .get_mut(&coll_key(database_id, collection_id))
            .ok_or(RepositoryError::NotFound)?;

        let item = find_mut(coll, |d| d.id == document_id)?;
        item.data.extend(data);
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        self.faults.enter(Operation::DeleteDocument)?;
        let mut guard = self.collections.lock().await;
        let coll = guard
            .get_mut(&coll_key(database_id, collection_id))
            .ok_or(RepositoryError::NotFound)?;

        let index = position(coll, |d| d.id == document_id)?;
        coll.remove(index);

        Ok(())
    }
}

pub struct InMemoryFileStore {
    endpoint: String,
    project: String,
    files: Mutex<HashMap<(String, String), UploadFile>>,
    faults: Faults,
}

impl InMemoryFileStore {
    pub fn new(endpoint: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            project: project.into(),
            files: Mutex::new(HashMap::new()),
            faults: Faults::default(),
        }
    }

    pub async fn contains(&self, bucket_id: &str, file_id: &str) -> bool {
        self.files
            .lock()
            .await
            .contains_key(&(bucket_id.to_string(), file_id.to_string()))
    }

    /// Number of files stored across every bucket.
    pub async fn len(&self) -> usize { self.files.lock().await.len() }
}

fault_controls!(InMemoryFileStore);

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: UploadFile,
    ) -> Result<StoredFile> {
        self.faults.enter(Operation::CreateFile)?;
        let mut guard = self.files.lock().await;
        let key = (bucket_id.to_string(), file_id.to_string());

        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }

        let stored = StoredFile {
            id: file_id.into(),
            bucket_id: bucket_id.to_string(),
            name: file.name.clone(),
            mime: file.mime.clone(),
            size: file.bytes.len() as u64,
        };
        guard.insert(key, file);

        Ok(stored)
    }

    async fn file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<String> {
        self.faults.enter(Operation::FilePreview)?;

        if !self.contains(bucket_id, file_id).await {
            return Err(RepositoryError::NotFound);
        }

        Ok(preview_url(
            &self.endpoint,
            &self.project,
            bucket_id,
            file_id,
            options,
        ))
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        self.faults.enter(Operation::DeleteFile)?;

        match self
            .files
            .lock()
            .await
            .remove(&(bucket_id.to_string(), file_id.to_string()))
        {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}
