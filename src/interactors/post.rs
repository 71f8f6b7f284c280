use std::sync::Arc;

use async_trait::async_trait;

use super::converters::{decode_page, decode_post, decode_saved, to_fields};
use super::models::{PostEditModel, PostLikesModel, PostModel, SaveModel};
use super::*;
use crate::config::StringsConfig;
use crate::entities::{parse_tags, FileId, UploadFile};
use crate::repositories::{
    unique_id, DocumentStore, PreviewOptions, Query, CREATED_AT, UPDATED_AT,
};
use crate::usecases::post::{
    create, delete, delete_saved, get, infinite, like, recent, save, search, update, PAGE_SIZE,
    RECENT_LIMIT,
};
use crate::utils::AlsoChain;

/// Uploads `file` and resolves its preview URL. A file whose preview cannot
/// be resolved is deleted again.
async fn upload_image(
    files: &Arc<dyn FileStore + Sync + Send>,
    bucket_id: &str,
    file: UploadFile,
    action: Action,
) -> Result<(FileId, String), ApiError> {
    let stored = files
        .create_file(bucket_id, &unique_id(), file)
        .await
        .map_err(remote_err(action))?;

    match files
        .file_preview(bucket_id, stored.id.as_str(), &PreviewOptions::POST_IMAGE)
        .await
    {
        Ok(url) => Ok((stored.id, url)),
        Err(e) => {
            discard_file(files, bucket_id, stored.id.as_str()).await;
            Err(remote_err(action)(e))
        },
    }
}

pub struct PostCreateInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub files: Arc<dyn FileStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl create::Usecase for PostCreateInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: create::Input) -> Result<create::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::CreatePost;

        let create::Input {
            creator,
            caption,
            file,
            location,
            tags,
        } = data;

        let (image_id, image_url) =
            upload_image(&self.files, &self.config.storage_id, file, action).await?;

        let model = PostModel {
            creator,
            caption,
            image_url,
            image_id: image_id.clone(),
            location,
            tags: parse_tags(&tags),
            likes: vec![],
        };

        let created = match to_fields(action, &model) {
            Ok(fields) => self
                .documents
                .create_document(
                    &self.config.database_id,
                    &self.config.post_collection_id,
                    &unique_id(),
                    fields,
                )
                .await
                .map_err(remote_err(action)),
            Err(e) => Err(logged(e)),
        };

        let doc = match created {
            Ok(doc) => doc,
            Err(e) => {
                discard_file(&self.files, &self.config.storage_id, image_id.as_str()).await;
                return Err(e);
            },
        };

        decode_post(action, doc)
            .map_err(logged)?
            .let_(|post| create::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostUpdateInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub files: Arc<dyn FileStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl update::Usecase for PostUpdateInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: update::Input) -> Result<update::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::UpdatePost;

        let update::Input {
            post_id,
            caption,
            file,
            image_url,
            image_id,
            location,
            tags,
        } = data;

        if post_id.is_empty() {
            return Err(precondition(action, "no post id"));
        }

        let uploaded = match file {
            Some(f) => Some(upload_image(&self.files, &self.config.storage_id, f, action).await?),
            None => None,
        };

        let (new_image_id, new_image_url) = match &uploaded {
            Some((id, url)) => (id.clone(), url.clone()),
            None => (image_id.clone(), image_url),
        };

        let model = PostEditModel {
            caption,
            image_url: new_image_url,
            image_id: new_image_id,
            location,
            tags: parse_tags(&tags),
        };

        let updated = match to_fields(action, &model) {
            Ok(fields) => self
                .documents
                .update_document(
                    &self.config.database_id,
                    &self.config.post_collection_id,
                    post_id.as_str(),
                    fields,
                )
                .await
                .map_err(remote_err(action)),
            Err(e) => Err(logged(e)),
        };

        let doc = match updated {
            Ok(doc) => doc,
            Err(e) => {
                if let Some((new_id, _)) = &uploaded {
                    discard_file(&self.files, &self.config.storage_id, new_id.as_str()).await;
                }
                return Err(e);
            },
        };

        // the replaced image is no longer referenced
        if let Some((new_id, _)) = &uploaded {
            if !image_id.is_empty() && &image_id != new_id {
                discard_file(&self.files, &self.config.storage_id, image_id.as_str()).await;
            }
        }

        decode_post(action, doc)
            .map_err(logged)?
            .let_(|post| update::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostDeleteInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub files: Arc<dyn FileStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl delete::Usecase for PostDeleteInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: delete::Input) -> Result<delete::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::DeletePost;

        let delete::Input { post_id, image_id } = data;

        if post_id.is_empty() || image_id.is_empty() {
            return Err(precondition(action, "no post or image id"));
        }

        self.documents
            .delete_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                post_id.as_str(),
            )
            .await
            .map_err(remote_err(action))?;

        discard_file(&self.files, &self.config.storage_id, image_id.as_str()).await;

        delete::Output { post_id }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostGetInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl get::Usecase for PostGetInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: get::Input) -> Result<get::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::GetPost;

        if data.post_id.is_empty() {
            return Err(precondition(action, "no post id"));
        }

        self.documents
            .get_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                data.post_id.as_str(),
            )
            .await
            .map_err(remote_err(action))?
            .let_(|doc| decode_post(action, doc))
            .map_err(logged)?
            .let_(|post| get::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostRecentInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl recent::Usecase for PostRecentInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: recent::Input) -> Result<recent::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::GetRecentPosts;

        self.documents
            .list_documents(
                &self.config.database_id,
                &self.config.post_collection_id,
                &[Query::order_desc(CREATED_AT), Query::limit(RECENT_LIMIT)],
            )
            .await
            .map_err(remote_err(action))?
            .let_(|list| decode_page(action, list, decode_post))
            .map_err(logged)?
            .let_(|posts| recent::Output { posts })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostInfiniteInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl infinite::Usecase for PostInfiniteInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: infinite::Input) -> Result<infinite::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::GetInfinitePosts;

        let mut queries = vec![Query::order_desc(UPDATED_AT), Query::limit(PAGE_SIZE)];
        if let Some(cursor) = data.cursor.filter(|c| !c.is_empty()) {
            queries.push(Query::cursor_after(cursor.as_str()));
        }

        let posts = self
            .documents
            .list_documents(
                &self.config.database_id,
                &self.config.post_collection_id,
                &queries,
            )
            .await
            .map_err(remote_err(action))?
            .let_(|list| decode_page(action, list, decode_post))
            .map_err(logged)?;

        let next_cursor = match posts.items.len() == PAGE_SIZE as usize {
            true => posts.items.last().map(|p| p.id.clone()),
            false => None,
        };

        infinite::Output { posts, next_cursor }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostSearchInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl search::Usecase for PostSearchInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: search::Input) -> Result<search::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::SearchPosts;

        if data.term.is_empty() {
            return Err(precondition(action, "no search term"));
        }

        self.documents
            .list_documents(
                &self.config.database_id,
                &self.config.post_collection_id,
                &[Query::search("caption", data.term.as_str())],
            )
            .await
            .map_err(remote_err(action))?
            .let_(|list| decode_page(action, list, decode_post))
            .map_err(logged)?
            .let_(|posts| search::Output { posts })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostLikeInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl like::Usecase for PostLikeInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: like::Input) -> Result<like::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::LikePost;

        let like::Input { post_id, likes } = data;

        if post_id.is_empty() {
            return Err(precondition(action, "no post id"));
        }

        let fields = to_fields(action, &PostLikesModel { likes }).map_err(logged)?;

        self.documents
            .update_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                post_id.as_str(),
                fields,
            )
            .await
            .map_err(remote_err(action))?
            .let_(|doc| decode_post(action, doc))
            .map_err(logged)?
            .let_(|post| like::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostSaveInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl save::Usecase for PostSaveInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: save::Input) -> Result<save::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::SavePost;

        let save::Input { post_id, user_id } = data;

        if post_id.is_empty() || user_id.is_empty() {
            return Err(precondition(action, "no post or user id"));
        }

        let fields = to_fields(action, &SaveModel {
            user: user_id,
            post: post_id,
        })
        .map_err(logged)?;

        self.documents
            .create_document(
                &self.config.database_id,
                &self.config.saves_collection_id,
                &unique_id(),
                fields,
            )
            .await
            .map_err(remote_err(action))?
            .let_(|doc| decode_saved(action, doc))
            .map_err(logged)?
            .let_(|saved| save::Output { saved })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostDeleteSavedInteractor {
    pub documents: Arc<dyn DocumentStore + Sync + Send>,
    pub config: Arc<StringsConfig>,
}
#[async_trait]
impl delete_saved::Usecase for PostDeleteSavedInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: delete_saved::Input) -> Result<delete_saved::Output, ApiError> {
        tracing::trace!("input - {:?}", data);
        let action = Action::DeleteSavedPost;

        let delete_saved::Input { saved_id } = data;

        if saved_id.is_empty() {
            return Err(precondition(action, "no saved record id"));
        }

        self.documents
            .delete_document(
                &self.config.database_id,
                &self.config.saves_collection_id,
                saved_id.as_str(),
            )
            .await
            .map_err(remote_err(action))?;

        delete_saved::Output { saved_id }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}
