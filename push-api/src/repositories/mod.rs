mod push_subscriptions_repo;
mod repo_error;

pub use push_subscriptions_repo::*;
pub use repo_error::RepositoryError;
