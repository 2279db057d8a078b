//! Repository domain - cache-first access to remote endpoints

mod cached;
mod result;
mod retry;

pub use cached::CachedRepository;
pub use result::RepositoryResult;
pub use retry::RetryConfig;
