pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod types;


pub use cache::L2SemanticCache;
pub use config::L2Config;
pub use error::{L2CacheError, L2CacheResult, VectorIndexError, VectorIndexResult};
pub use index::{IndexHit, VectorIndex};
pub use types::L2LookupResult;
