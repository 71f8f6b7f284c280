use std::sync::Arc;

use crate::config::StringsConfig;
use crate::context::AuthContext;
use crate::controllers::account::AccountController;
use crate::controllers::post::{PostController, PostUsecases};
use crate::controllers::user::UserController;
use crate::controllers::QueryClient;
use crate::interactors::account::{
    CreateAccountInteractor, GetCurrentUserInteractor, SignInInteractor, SignOutInteractor,
};
use crate::interactors::post::{
    PostCreateInteractor, PostDeleteInteractor, PostDeleteSavedInteractor, PostGetInteractor,
    PostInfiniteInteractor, PostLikeInteractor, PostRecentInteractor, PostSaveInteractor,
    PostSearchInteractor, PostUpdateInteractor,
};
use crate::interactors::user::UserGetsInteractor;
use crate::repositories::mock::{InMemoryDocumentStore, InMemoryFileStore, InMemoryIdentity};
use crate::repositories::mongo::MongoDocumentStore;
use crate::repositories::{DocumentStore, FileStore, IdentityService};

/// Everything a client needs, wired over one set of backends.
pub struct Strings {
    pub config: Arc<StringsConfig>,
    pub queries: Arc<QueryClient>,
    pub auth: AuthContext,
    pub account: Arc<AccountController>,
    pub posts: PostController,
    pub users: UserController,
}

pub fn build(
    config: StringsConfig,
    identity: Arc<dyn IdentityService + Sync + Send>,
    documents: Arc<dyn DocumentStore + Sync + Send>,
    files: Arc<dyn FileStore + Sync + Send>,
) -> Strings {
    let config = Arc::new(config);
    let queries = Arc::new(QueryClient::new());

    let account = Arc::new(AccountController::new(
        queries.clone(),
        Arc::new(CreateAccountInteractor {
            identity: identity.clone(),
            documents: documents.clone(),
            config: config.clone(),
        }),
        Arc::new(SignInInteractor {
            identity: identity.clone(),
        }),
        Arc::new(SignOutInteractor {
            identity: identity.clone(),
        }),
        Arc::new(GetCurrentUserInteractor {
            identity,
            documents: documents.clone(),
            config: config.clone(),
        }),
    ));

    let posts = PostController::new(queries.clone(), PostUsecases {
        create: Arc::new(PostCreateInteractor {
            documents: documents.clone(),
            files: files.clone(),
            config: config.clone(),
        }),
        update: Arc::new(PostUpdateInteractor {
            documents: documents.clone(),
            files: files.clone(),
            config: config.clone(),
        }),
        delete: Arc::new(PostDeleteInteractor {
            documents: documents.clone(),
            files,
            config: config.clone(),
        }),
        get: Arc::new(PostGetInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
        recent: Arc::new(PostRecentInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
        infinite: Arc::new(PostInfiniteInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
        search: Arc::new(PostSearchInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
        like: Arc::new(PostLikeInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
        save: Arc::new(PostSaveInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
        delete_saved: Arc::new(PostDeleteSavedInteractor {
            documents: documents.clone(),
            config: config.clone(),
        }),
    });

    let users = UserController::new(
        queries.clone(),
        Arc::new(UserGetsInteractor {
            documents,
            config: config.clone(),
        }),
    );

    Strings {
        auth: AuthContext::new(account.clone(), queries.clone()),
        config,
        queries,
        account,
        posts,
        users,
    }
}

pub fn in_memory(config: StringsConfig) -> Strings {
    let identity = InMemoryIdentity::new(&config.endpoint, &config.project_id);
    let files = InMemoryFileStore::new(&config.endpoint, &config.project_id);

    build(
        config,
        Arc::new(identity),
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(files),
    )
}

/// Documents on MongoDB. Identity and storage stay with the caller.
pub async fn mongo(
    uri_str: impl AsRef<str>,
    config: StringsConfig,
    identity: Arc<dyn IdentityService + Sync + Send>,
    files: Arc<dyn FileStore + Sync + Send>,
) -> ::anyhow::Result<Strings> {
    let documents = MongoDocumentStore::new_with_uri(uri_str).await?;

    Ok(build(config, identity, Arc::new(documents), files))
}
