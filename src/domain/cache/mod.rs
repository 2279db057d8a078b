//! Cache domain - key derivation, entries and the TTL store abstraction

mod clock;
mod key;
mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{
    CACHE_PREFIX, CacheKeyGenerator, CacheKeyParams, CanonicalKeyGenerator, LegacyKeyGenerator,
};
pub use repository::{CACHE_TTL, CacheEntry, CacheHit, CacheStore};
