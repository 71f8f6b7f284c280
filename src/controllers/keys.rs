use crate::entities::PostId;

/// Identifies one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    RecentPosts,
    /// Every cached post listing.
    Posts,
    InfinitePosts,
    CurrentUser,
    PostById(PostId),
    SearchPosts(String),
    Users(Option<u32>),
}

impl ::core::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            QueryKey::RecentPosts => f.write_str("recent-posts"),
            QueryKey::Posts => f.write_str("posts"),
            QueryKey::InfinitePosts => f.write_str("infinite-posts"),
            QueryKey::CurrentUser => f.write_str("current-user"),
            QueryKey::PostById(id) => write!(f, "post-by-id({})", id),
            QueryKey::SearchPosts(term) => write!(f, "search-posts({})", term),
            QueryKey::Users(Some(n)) => write!(f, "users({})", n),
            QueryKey::Users(None) => f.write_str("users"),
        }
    }
}

// keys made stale by each successful mutation

pub fn after_create_post() -> Vec<QueryKey> { vec![QueryKey::RecentPosts] }

pub fn after_update_post(post_id: &PostId) -> Vec<QueryKey> {
    vec![QueryKey::PostById(post_id.clone())]
}

pub fn after_delete_post() -> Vec<QueryKey> { vec![QueryKey::RecentPosts] }

pub fn after_like_post(post_id: &PostId) -> Vec<QueryKey> {
    vec![
        QueryKey::PostById(post_id.clone()),
        QueryKey::RecentPosts,
        QueryKey::Posts,
        QueryKey::CurrentUser,
    ]
}

pub fn after_save_post() -> Vec<QueryKey> {
    vec![QueryKey::RecentPosts, QueryKey::Posts, QueryKey::CurrentUser]
}

pub fn after_delete_saved_post() -> Vec<QueryKey> {
    vec![QueryKey::RecentPosts, QueryKey::Posts, QueryKey::CurrentUser]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn like_marks_four_keys() {
        let keys = after_like_post(&"p1".into()).into_iter().collect::<HashSet<_>>();

        assert_eq!(
            keys,
            [
                QueryKey::PostById("p1".into()),
                QueryKey::RecentPosts,
                QueryKey::Posts,
                QueryKey::CurrentUser,
            ]
            .into_iter()
            .collect()
        );
    }

    #[test]
    fn save_and_unsave_mark_the_same_keys() {
        assert_eq!(after_save_post(), after_delete_saved_post());
        assert!(!after_save_post().contains(&QueryKey::InfinitePosts));
    }

    #[test]
    fn display() {
        assert_eq!(QueryKey::PostById("x".into()).to_string(), "post-by-id(x)");
        assert_eq!(QueryKey::Users(None).to_string(), "users");
    }
}
