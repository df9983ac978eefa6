//! In-memory TTL caches shared by every data service.

mod ttl;

pub use ttl::{KeyedTtlCache, TtlCache};
