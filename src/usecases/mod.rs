use std::sync::Arc;

use crate::repositories::RepositoryError;

macro_rules! usecase {
    ($n:ident : { $( $i:tt )* } => { $( $o:tt )* }) => {
        pub mod $n {
            #[allow(unused_imports)]
            use crate::entities;

            #[::async_trait::async_trait]
            pub trait Usecase {
                async fn handle(
                    &self,
                    data: Input,
                ) -> ::core::result::Result<Output, crate::usecases::ApiError>;
            }

            #[derive(Debug, Clone)]
            pub struct Input { $( $i )* }

            #[derive(Debug, Clone)]
            pub struct Output { $( $o )* }
        }
    };
}

pub mod account;
pub mod post;
pub mod user;

/// What the caller was trying to do when an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateAccount,
    SignIn,
    SignOut,
    GetCurrentUser,
    CreatePost,
    UpdatePost,
    DeletePost,
    GetPost,
    GetRecentPosts,
    GetInfinitePosts,
    SearchPosts,
    LikePost,
    SavePost,
    DeleteSavedPost,
    GetUsers,
}

impl ::core::fmt::Display for Action {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        let s = match self {
            Action::CreateAccount => "sign up",
            Action::SignIn => "sign in",
            Action::SignOut => "sign out",
            Action::GetCurrentUser => "loading the current user",
            Action::CreatePost => "creating the post",
            Action::UpdatePost => "updating the post",
            Action::DeletePost => "deleting the post",
            Action::GetPost => "loading the post",
            Action::GetRecentPosts => "loading recent posts",
            Action::GetInfinitePosts => "loading posts",
            Action::SearchPosts => "searching posts",
            Action::LikePost => "liking the post",
            Action::SavePost => "saving the post",
            Action::DeleteSavedPost => "removing the saved post",
            Action::GetUsers => "loading users",
        };

        f.write_str(s)
    }
}

#[derive(Debug, Clone, ::thiserror::Error)]
pub enum ApiError {
    /// Rejected before any remote call.
    #[error("{action} rejected: {message}")]
    Precondition { action: Action, message: String },
    #[error("{action} failed: {source}")]
    Remote {
        action: Action,
        #[source]
        source: Arc<RepositoryError>,
    },
    /// The service answered, but an expected record is absent.
    #[error("{action} failed: no {what}")]
    Missing { action: Action, what: &'static str },
    #[error("{action} failed: unexpected document shape: {message}")]
    Decode { action: Action, message: String },
}

impl ApiError {
    pub fn remote(action: Action) -> impl FnOnce(RepositoryError) -> ApiError {
        move |e| ApiError::Remote {
            action,
            source: Arc::new(e),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            ApiError::Precondition { action, .. }
            | ApiError::Remote { action, .. }
            | ApiError::Missing { action, .. }
            | ApiError::Decode { action, .. } => *action,
        }
    }

    /// No identity behind the request.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Remote { source, .. } if matches!(**source, RepositoryError::Unauthorized))
    }

    /// Short notice suitable for a toast.
    pub fn toast(&self) -> String {
        let action = self.action().to_string();
        let mut chars = action.chars();

        match chars.next() {
            Some(c) => format!(
                "{}{} failed. Please try again.",
                c.to_uppercase(),
                chars.as_str()
            ),
            None => "Failed. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_names_the_action() {
        let e = ApiError::Missing {
            action: Action::CreateAccount,
            what: "account",
        };

        assert_eq!(e.toast(), "Sign up failed. Please try again.");
        assert_eq!(e.to_string(), "sign up failed: no account");
    }

    #[test]
    fn unauthorized_detection() {
        let e = ApiError::remote(Action::GetCurrentUser)(RepositoryError::Unauthorized);
        assert!(e.is_unauthorized());

        let e = ApiError::remote(Action::GetCurrentUser)(RepositoryError::NotFound);
        assert!(!e.is_unauthorized());
    }
}
