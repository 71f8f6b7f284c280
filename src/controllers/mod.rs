/// Wraps a usecase into a [`Mutation`] that marks `$keys` stale on success.
macro_rules! mutation {
    ($client:expr, $action:expr, $m:ident => $u:expr, $keys:expr) => {{
        let usecase = $u;

        $crate::controllers::Mutation::<$m::Input, $m::Output>::new($client, $action, move |data| {
            let usecase = usecase.clone();
            async move { usecase.handle(data).await }
        }, $keys)
    }};
}

pub mod account;
pub mod post;
pub mod user;

mod keys;
mod mutation;
mod query;

pub use keys::*;
pub use mutation::{Mutation, MutationStatus};
pub use query::QueryClient;
