use std::sync::Arc;

use crate::repositories::{FileStore, RepositoryError};
use crate::usecases::{Action, ApiError};
use crate::utils::LetChain;

pub mod account;
pub mod post;
pub mod user;

mod converters;
mod models;

fn remote_err(action: Action) -> impl FnOnce(RepositoryError) -> ApiError {
    move |e| {
        tracing::error!("{} failed: {}", action, e);
        ApiError::remote(action)(e)
    }
}

fn logged(e: ApiError) -> ApiError {
    tracing::error!("{}", e);
    e
}

fn precondition(action: Action, message: impl Into<String>) -> ApiError {
    ApiError::Precondition {
        action,
        message: message.into(),
    }
    .let_(logged)
}

/// Compensating delete. Failure is logged and otherwise ignored.
async fn discard_file(files: &Arc<dyn FileStore + Sync + Send>, bucket_id: &str, file_id: &str) {
    match files.delete_file(bucket_id, file_id).await {
        Ok(()) => tracing::debug!("discarded file {}", file_id),
        Err(e) => tracing::warn!("cannot discard file {}: {}", file_id, e),
    }
}
