use std::collections::HashSet;
use std::sync::Arc;

use strings::config::StringsConfig;
use strings::controllers::{MutationStatus, QueryKey};
use strings::entities::{Post, UploadFile, UserId};
use strings::repositories::mock::{
    InMemoryDocumentStore, InMemoryFileStore, InMemoryIdentity, Operation,
};
use strings::repositories::IdentityService;
use strings::usecases::post::{delete, delete_saved, like, save};
use strings::usecases::{Action, ApiError};
use strings::validation::{PostForm, SignUpForm};
use strings::Strings;

struct Harness {
    app: Strings,
    identity: Arc<InMemoryIdentity>,
    documents: Arc<InMemoryDocumentStore>,
    files: Arc<InMemoryFileStore>,
}

impl Harness {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let config = StringsConfig::default();
        let identity = Arc::new(InMemoryIdentity::new(&config.endpoint, &config.project_id));
        let documents = Arc::new(InMemoryDocumentStore::new());
        let files = Arc::new(InMemoryFileStore::new(&config.endpoint, &config.project_id));

        let app = strings::build(config, identity.clone(), documents.clone(), files.clone());

        Self {
            app,
            identity,
            documents,
            files,
        }
    }

    async fn posts_stored(&self) -> usize {
        let c = &self.app.config;
        self.documents.count(&c.database_id, &c.post_collection_id).await
    }

    fn remote_calls(&self) -> usize {
        self.identity.calls() + self.documents.calls() + self.files.calls()
    }

    async fn sign_up(&self) -> UserId {
        let signed_in = self
            .app
            .auth
            .sign_up(
                SignUpForm {
                    name: "Ada Lovelace".to_string(),
                    username: "ada".to_string(),
                    email: "ada@example.com".to_string(),
                    password: "analytical".to_string(),
                }
                .into_input(),
            )
            .await
            .unwrap();
        assert!(signed_in);

        self.app.auth.user().await.unwrap().id
    }

    async fn post(&self, creator: &UserId, caption: &str) -> Post {
        let form = PostForm {
            caption: caption.to_string(),
            location: "Kyoto".to_string(),
            tags: "travel, food".to_string(),
        };

        self.app
            .posts
            .create
            .mutate(form.into_create(creator.clone(), image("photo.png")))
            .await
            .unwrap()
            .post
    }
}

fn image(name: &str) -> UploadFile {
    UploadFile {
        name: name.to_string(),
        mime: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

#[tokio::test]
async fn sign_up_creates_profile() {
    let h = Harness::new();

    h.sign_up().await;

    let user = h.app.auth.user().await.unwrap();
    let account = h.identity.get_account().await.unwrap();

    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.username, "ada");
    assert_eq!(user.account_id, account.id);
    assert_eq!(
        user.image_url,
        "http://localhost/v1/avatars/initials?name=Ada%20Lovelace&project=strings"
    );
    assert_eq!(user.bio, None);
}

#[tokio::test]
async fn signed_out_is_not_an_error() {
    let h = Harness::new();

    assert!(!h.app.auth.check_auth_user().await.unwrap());
    assert!(!h.app.auth.is_authenticated().await);
}

#[tokio::test]
async fn duplicate_sign_up_fails_with_toast() {
    let h = Harness::new();
    h.sign_up().await;

    let e = h
        .app
        .auth
        .sign_up(
            SignUpForm {
                name: "Ada".to_string(),
                username: "ada2".to_string(),
                email: "ada@example.com".to_string(),
                password: "analytical".to_string(),
            }
            .into_input(),
        )
        .await
        .unwrap_err();

    assert_eq!(e.toast(), "Sign up failed. Please try again.");
    assert_eq!(
        h.app.account.create_account.status().await,
        MutationStatus::Error
    );
}

#[tokio::test]
async fn create_post_parses_tags_and_previews() {
    let h = Harness::new();
    let me = h.sign_up().await;

    let post = h.post(&me, "first light").await;

    assert_eq!(post.creator, me);
    assert_eq!(post.tags, vec!["travel", "food"]);
    assert!(post.likes.is_empty());
    assert!(post
        .image_url
        .starts_with("http://localhost/v1/storage/buckets/media/files/"));
    assert!(post
        .image_url
        .ends_with("/preview?width=2000&height=2000&gravity=top&quality=100&project=strings"));
    assert!(h.files.contains("media", post.image_id.as_str()).await);
}

#[tokio::test]
async fn upload_failure_creates_no_post() {
    let h = Harness::new();
    let me = h.sign_up().await;
    h.files.fail_on(Operation::CreateFile);

    let form = PostForm {
        caption: "never stored".to_string(),
        location: "Kyoto".to_string(),
        tags: String::new(),
    };
    let e = h
        .app
        .posts
        .create
        .mutate(form.into_create(me, image("a.png")))
        .await
        .unwrap_err();

    assert!(matches!(e, ApiError::Remote { .. }));
    assert_eq!(h.posts_stored().await, 0);
    assert_eq!(h.app.posts.create.status().await, MutationStatus::Error);
}

#[tokio::test]
async fn document_failure_removes_uploaded_file() {
    let h = Harness::new();
    let me = h.sign_up().await;
    h.documents.fail_on(Operation::CreateDocument);

    let form = PostForm {
        caption: "never stored".to_string(),
        location: "Kyoto".to_string(),
        tags: String::new(),
    };
    h.app
        .posts
        .create
        .mutate(form.into_create(me, image("a.png")))
        .await
        .unwrap_err();

    assert_eq!(h.files.len().await, 0);
    assert_eq!(h.posts_stored().await, 0);
}

#[tokio::test]
async fn preview_failure_removes_uploaded_file() {
    let h = Harness::new();
    let me = h.sign_up().await;
    h.files.fail_on(Operation::FilePreview);

    let form = PostForm {
        caption: "never stored".to_string(),
        location: "Kyoto".to_string(),
        tags: String::new(),
    };
    h.app
        .posts
        .create
        .mutate(form.into_create(me, image("a.png")))
        .await
        .unwrap_err();

    assert_eq!(h.files.len().await, 0);
    assert_eq!(h.posts_stored().await, 0);
}

#[tokio::test]
async fn infinite_feed_pages_by_ten() {
    let h = Harness::new();
    let me = h.sign_up().await;
    for i in 0..25 {
        h.post(&me, &format!("post number {}", i)).await;
    }

    let feed = h.app.posts.infinite_posts().await.unwrap();
    assert_eq!(feed.pages.len(), 1);
    assert_eq!(feed.pages[0].items.len(), 10);
    assert!(feed.has_next_page());

    let feed = h.app.posts.fetch_next_page().await.unwrap();
    assert_eq!(feed.pages[1].items.len(), 10);
    assert!(feed.has_next_page());

    let feed = h.app.posts.fetch_next_page().await.unwrap();
    assert_eq!(feed.pages[2].items.len(), 5);
    assert!(!feed.has_next_page());

    let ids = feed.posts().map(|p| p.id.clone()).collect::<HashSet<_>>();
    assert_eq!(ids.len(), 25);

    let before = h.remote_calls();
    let feed = h.app.posts.fetch_next_page().await.unwrap();
    assert_eq!(feed.pages.len(), 3);
    assert_eq!(h.remote_calls(), before);
}

#[tokio::test]
async fn delete_without_image_id_makes_no_call() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "keep me around").await;

    let before = h.remote_calls();
    let e = h
        .app
        .posts
        .delete
        .mutate(delete::Input {
            post_id: post.id.clone(),
            image_id: "".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(e, ApiError::Precondition { .. }));
    assert_eq!(h.remote_calls(), before);
    assert_eq!(h.posts_stored().await, 1);
}

#[tokio::test]
async fn delete_removes_document_and_file() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "short lived").await;
    h.app.posts.recent_posts().await.unwrap();

    h.app
        .posts
        .delete
        .mutate(delete::Input {
            post_id: post.id.clone(),
            image_id: post.image_id.clone(),
        })
        .await
        .unwrap();

    assert_eq!(h.posts_stored().await, 0);
    assert!(!h.files.contains("media", post.image_id.as_str()).await);
    assert_eq!(
        h.app.queries.stale_keys().await,
        [QueryKey::RecentPosts].into_iter().collect()
    );
    assert!(h.app.posts.recent_posts().await.unwrap().items.is_empty());
}

#[tokio::test]
async fn like_invalidates_exactly_its_keys() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "like me please").await;

    h.app.posts.recent_posts().await.unwrap();
    h.app.posts.post_by_id(&post.id).await.unwrap();
    h.app.posts.infinite_posts().await.unwrap();
    h.app.posts.search_posts("like").await.unwrap();
    h.app.users.users(None).await.unwrap();
    h.app.account.current_user().await.unwrap();
    h.app.queries.set(QueryKey::Posts, ()).await;

    let liked = h
        .app
        .posts
        .like
        .mutate(like::Input {
            post_id: post.id.clone(),
            likes: post.toggled_likes(&me),
        })
        .await
        .unwrap()
        .post;
    assert!(liked.is_liked_by(&me));

    assert_eq!(
        h.app.queries.stale_keys().await,
        [
            QueryKey::PostById(post.id.clone()),
            QueryKey::RecentPosts,
            QueryKey::Posts,
            QueryKey::CurrentUser,
        ]
        .into_iter()
        .collect()
    );

    let fresh = h.app.posts.post_by_id(&post.id).await.unwrap().unwrap();
    assert_eq!(fresh.likes, vec![me]);
}

#[tokio::test]
async fn update_replaces_image() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "before the edit").await;
    h.app.posts.post_by_id(&post.id).await.unwrap();

    let mut form = PostForm::from_post(&post);
    form.caption = "after the edit".to_string();
    let updated = h
        .app
        .posts
        .update
        .mutate(form.into_update(&post, Some(image("b.png"))))
        .await
        .unwrap()
        .post;

    assert_ne!(updated.image_id, post.image_id);
    assert!(!h.files.contains("media", post.image_id.as_str()).await);
    assert!(h.files.contains("media", updated.image_id.as_str()).await);
    assert_eq!(h.files.len().await, 1);
    assert_eq!(
        h.app.queries.is_stale(&QueryKey::PostById(post.id.clone())).await,
        Some(true)
    );

    let fresh = h.app.posts.post_by_id(&post.id).await.unwrap().unwrap();
    assert_eq!(fresh.caption, "after the edit");
    assert_eq!(fresh.tags, vec!["travel", "food"]);
}

#[tokio::test]
async fn failed_update_discards_new_image_only() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "before the edit").await;
    h.documents.fail_on(Operation::UpdateDocument);

    let mut form = PostForm::from_post(&post);
    form.caption = "after the edit".to_string();
    let e = h
        .app
        .posts
        .update
        .mutate(form.into_update(&post, Some(image("b.png"))))
        .await
        .unwrap_err();

    assert!(matches!(e, ApiError::Remote { action: Action::UpdatePost, .. }));
    assert_eq!(h.files.len().await, 1);
    assert!(h.files.contains("media", post.image_id.as_str()).await);

    h.documents.recover(Operation::UpdateDocument);
    let stored = h.app.posts.post_by_id(&post.id).await.unwrap().unwrap();
    assert_eq!(stored.caption, "before the edit");
    assert_eq!(stored.image_id, post.image_id);
}

#[tokio::test]
async fn preview_failure_on_update_keeps_post_untouched() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "before the edit").await;
    h.files.fail_on(Operation::FilePreview);

    let before = h.documents.calls();
    let mut form = PostForm::from_post(&post);
    form.caption = "after the edit".to_string();
    h.app
        .posts
        .update
        .mutate(form.into_update(&post, Some(image("b.png"))))
        .await
        .unwrap_err();

    assert_eq!(h.documents.calls(), before);
    assert_eq!(h.files.len().await, 1);
    assert!(h.files.contains("media", post.image_id.as_str()).await);

    let stored = h.app.posts.post_by_id(&post.id).await.unwrap().unwrap();
    assert_eq!(stored.caption, "before the edit");
}

#[tokio::test]
async fn profile_failure_keeps_identity() {
    let h = Harness::new();
    h.documents.fail_on(Operation::CreateDocument);

    let e = h
        .app
        .auth
        .sign_up(
            SignUpForm {
                name: "Ada Lovelace".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "analytical".to_string(),
            }
            .into_input(),
        )
        .await
        .unwrap_err();

    assert!(matches!(e, ApiError::Remote { action: Action::CreateAccount, .. }));
    assert!(!h.app.auth.is_authenticated().await);

    let c = &h.app.config;
    assert_eq!(h.documents.count(&c.database_id, &c.user_collection_id).await, 0);

    let session = h
        .identity
        .create_session("ada@example.com", "analytical")
        .await
        .unwrap();
    assert_eq!(h.identity.get_account().await.unwrap().id, session.account_id);
}

#[tokio::test]
async fn update_without_file_keeps_image() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "before the edit").await;

    let updated = h
        .app
        .posts
        .update
        .mutate(PostForm::from_post(&post).into_update(&post, None))
        .await
        .unwrap()
        .post;

    assert_eq!(updated.image_id, post.image_id);
    assert_eq!(updated.image_url, post.image_url);
    assert!(h.files.contains("media", post.image_id.as_str()).await);
}

#[tokio::test]
async fn save_and_unsave() {
    let h = Harness::new();
    let me = h.sign_up().await;
    let post = h.post(&me, "worth keeping").await;

    let saved = h
        .app
        .posts
        .save
        .mutate(save::Input {
            post_id: post.id.clone(),
            user_id: me.clone(),
        })
        .await
        .unwrap()
        .saved;

    let current = h.app.account.current_user().await.unwrap();
    assert_eq!(current.saved_record(&post.id).map(|s| &s.id), Some(&saved.id));

    h.app
        .posts
        .delete_saved
        .mutate(delete_saved::Input {
            saved_id: saved.id.clone(),
        })
        .await
        .unwrap();

    let current = h.app.account.current_user().await.unwrap();
    assert!(current.saved_record(&post.id).is_none());
}

#[tokio::test]
async fn disabled_queries_skip_the_network() {
    let h = Harness::new();

    let before = h.remote_calls();
    assert!(h.app.posts.post_by_id(&"".into()).await.unwrap().is_none());
    assert!(h.app.posts.search_posts("").await.unwrap().is_none());
    assert_eq!(h.remote_calls(), before);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let h = Harness::new();
    let me = h.sign_up().await;
    h.post(&me, "Sunset over the bay").await;
    h.post(&me, "Morning coffee").await;

    let found = h.app.posts.search_posts("sunset").await.unwrap().unwrap();

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].caption, "Sunset over the bay");
}

#[tokio::test]
async fn sign_out_forgets_everything() {
    let h = Harness::new();
    h.sign_up().await;
    h.app.posts.recent_posts().await.unwrap();

    h.app.auth.sign_out().await.unwrap();

    assert!(!h.app.auth.is_authenticated().await);
    assert!(h.app.queries.is_stale(&QueryKey::CurrentUser).await.is_none());
    assert!(h.app.queries.is_stale(&QueryKey::RecentPosts).await.is_none());
    assert!(!h.app.auth.check_auth_user().await.unwrap());
}

#[tokio::test]
async fn cached_reads_skip_the_network() {
    let h = Harness::new();
    let me = h.sign_up().await;
    h.post(&me, "cache this post").await;

    h.app.posts.recent_posts().await.unwrap();
    let before = h.remote_calls();
    let (a, b) = tokio::join!(h.app.posts.recent_posts(), h.app.posts.recent_posts());

    assert_eq!(a.unwrap().items.len(), 1);
    assert_eq!(b.unwrap().items.len(), 1);
    assert_eq!(h.remote_calls(), before);
}
