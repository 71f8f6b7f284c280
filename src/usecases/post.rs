/// Posts per page of the infinite feed.
pub const PAGE_SIZE: u32 = 10;

/// Posts shown on the home feed.
pub const RECENT_LIMIT: u32 = 20;

usecase! {
    create : {
        pub creator: entities::UserId,
        pub caption: String,
        pub file: entities::UploadFile,
        pub location: String,
        /// Comma separated.
        pub tags: String,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    update : {
        pub post_id: entities::PostId,
        pub caption: String,
        /// Replacement image, if any.
        pub file: Option<entities::UploadFile>,
        pub image_url: String,
        pub image_id: entities::FileId,
        pub location: String,
        pub tags: String,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    delete : {
        pub post_id: entities::PostId,
        pub image_id: entities::FileId,
    } => {
        pub post_id: entities::PostId,
    }
}

usecase! {
    get : {
        pub post_id: entities::PostId,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    recent : {} => {
        pub posts: entities::Page<entities::Post>,
    }
}

usecase! {
    infinite : {
        /// Id of the last post of the previous page.
        pub cursor: Option<entities::PostId>,
    } => {
        pub posts: entities::Page<entities::Post>,
        /// `None` once a page comes back short.
        pub next_cursor: Option<entities::PostId>,
    }
}

usecase! {
    search : {
        pub term: String,
    } => {
        pub posts: entities::Page<entities::Post>,
    }
}

usecase! {
    like : {
        pub post_id: entities::PostId,
        pub likes: Vec<entities::UserId>,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    save : {
        pub post_id: entities::PostId,
        pub user_id: entities::UserId,
    } => {
        pub saved: entities::SavedPost,
    }
}

usecase! {
    delete_saved : {
        pub saved_id: entities::SaveId,
    } => {
        pub saved_id: entities::SaveId,
    }
}
