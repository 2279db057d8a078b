//! Domain layer - Core business logic and entities

pub mod analytics;
pub mod cache;
pub mod competitor;
pub mod error;
pub mod repository;
pub mod storage;

pub use analytics::{ApiRequest, Dto, Endpoint, RemoteFetcher, RemoteResponse};
pub use cache::{CacheKeyGenerator, CacheKeyParams, CacheStore, Clock};
pub use competitor::{Candidate, CompetitorScorer, ReferenceProduct, ScoredCandidate};
pub use error::DomainError;
pub use repository::{CachedRepository, RepositoryResult, RetryConfig};
pub use storage::KeyValueStorage;
