use std::sync::Arc;

use tokio::sync::Mutex;

use super::*;
use crate::entities::{Page, Post, PostId};
use crate::usecases::post::{create, delete, delete_saved, get, infinite, like, recent, save, search, update};
use crate::usecases::{Action, ApiError};

/// Every page of the feed loaded so far.
#[derive(Debug, Clone, PartialEq)]
pub struct InfinitePages {
    pub pages: Vec<Page<Post>>,
    pub next_cursor: Option<PostId>,
}

impl InfinitePages {
    pub fn has_next_page(&self) -> bool { self.next_cursor.is_some() }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }
}

pub struct PostController {
    client: Arc<QueryClient>,

    get: Arc<dyn get::Usecase + Sync + Send>,
    recent: Arc<dyn recent::Usecase + Sync + Send>,
    search: Arc<dyn search::Usecase + Sync + Send>,
    infinite: Arc<dyn infinite::Usecase + Sync + Send>,
    infinite_lock: Mutex<()>,

    pub create: Mutation<create::Input, create::Output>,
    pub update: Mutation<update::Input, update::Output>,
    pub delete: Mutation<delete::Input, delete::Output>,
    pub like: Mutation<like::Input, like::Output>,
    pub save: Mutation<save::Input, save::Output>,
    pub delete_saved: Mutation<delete_saved::Input, delete_saved::Output>,
}

pub struct PostUsecases {
    pub create: Arc<dyn create::Usecase + Sync + Send>,
    pub update: Arc<dyn update::Usecase + Sync + Send>,
    pub delete: Arc<dyn delete::Usecase + Sync + Send>,
    pub get: Arc<dyn get::Usecase + Sync + Send>,
    pub recent: Arc<dyn recent::Usecase + Sync + Send>,
    pub infinite: Arc<dyn infinite::Usecase + Sync + Send>,
    pub search: Arc<dyn search::Usecase + Sync + Send>,
    pub like: Arc<dyn like::Usecase + Sync + Send>,
    pub save: Arc<dyn save::Usecase + Sync + Send>,
    pub delete_saved: Arc<dyn delete_saved::Usecase + Sync + Send>,
}

impl PostController {
    pub fn new(client: Arc<QueryClient>, u: PostUsecases) -> Self {
        Self {
            create: mutation!(client.clone(), Action::CreatePost, create => u.create, |_| {
                after_create_post()
            }),
            update: mutation!(client.clone(), Action::UpdatePost, update => u.update, |o| {
                after_update_post(&o.post.id)
            }),
            delete: mutation!(client.clone(), Action::DeletePost, delete => u.delete, |_| {
                after_delete_post()
            }),
            like: mutation!(client.clone(), Action::LikePost, like => u.like, |o| {
                after_like_post(&o.post.id)
            }),
            save: mutation!(client.clone(), Action::SavePost, save => u.save, |_| {
                after_save_post()
            }),
            delete_saved: mutation!(
                client.clone(),
                Action::DeleteSavedPost,
                delete_saved => u.delete_saved,
                |_| after_delete_saved_post()
            ),

            get: u.get,
            recent: u.recent,
            search: u.search,
            infinite: u.infinite,
            infinite_lock: Mutex::new(()),

            client,
        }
    }

    pub async fn recent_posts(&self) -> Result<Arc<Page<Post>>, ApiError> {
        let u = self.recent.clone();

        self.client
            .fetch(QueryKey::RecentPosts, move || async move {
                u.handle(recent::Input {}).await.map(|o| o.posts)
            })
            .await
    }

    /// `None` without a remote call when `post_id` is empty.
    pub async fn post_by_id(&self, post_id: &PostId) -> Result<Option<Arc<Post>>, ApiError> {
        if post_id.is_empty() {
            return Ok(None);
        }

        let u = self.get.clone();
        let input = get::Input {
            post_id: post_id.clone(),
        };

        self.client
            .fetch(QueryKey::PostById(post_id.clone()), move || async move {
                u.handle(input).await.map(|o| o.post)
            })
            .await
            .map(Some)
    }

    /// `None` without a remote call when `term` is empty.
    pub async fn search_posts(&self, term: &str) -> Result<Option<Arc<Page<Post>>>, ApiError> {
        if term.is_empty() {
            return Ok(None);
        }

        let u = self.search.clone();
        let input = search::Input {
            term: term.to_string(),
        };

        self.client
            .fetch(QueryKey::SearchPosts(term.to_string()), move || async move {
                u.handle(input).await.map(|o| o.posts)
            })
            .await
            .map(Some)
    }

    /// The feed as loaded so far; fetches the first page when nothing is
    /// cached or the cache went stale.
    pub async fn infinite_posts(&self) -> Result<Arc<InfinitePages>, ApiError> {
        let u = self.infinite.clone();

        self.client
            .fetch(QueryKey::InfinitePosts, move || async move {
                let out = u.handle(infinite::Input { cursor: None }).await?;

                Ok(InfinitePages {
                    pages: vec![out.posts],
                    next_cursor: out.next_cursor,
                })
            })
            .await
    }

    /// Appends the page after the last loaded one. Does nothing once the end
    /// of the feed was reached.
    pub async fn fetch_next_page(&self) -> Result<Arc<InfinitePages>, ApiError> {
        let _guard = self.infinite_lock.lock().await;

        let loaded = self.infinite_posts().await?;
        let cursor = match &loaded.next_cursor {
            Some(c) => c.clone(),
            None => {
                tracing::trace!("no next page");
                return Ok(loaded);
            },
        };

        let out = self
            .infinite
            .handle(infinite::Input {
                cursor: Some(cursor),
            })
            .await?;

        let mut pages = (*loaded).clone();
        pages.pages.push(out.posts);
        pages.next_cursor = out.next_cursor;

        self.client.set(QueryKey::InfinitePosts, pages.clone()).await;

        Ok(Arc::new(pages))
    }
}
