//! Storage domain - persistent key-value collaborator behind the cache

mod repository;

pub use repository::KeyValueStorage;

#[cfg(test)]
pub use repository::mock::MockStorage;
