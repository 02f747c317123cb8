pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::client::CacheClient;
pub use crate::entry::CacheRef;
pub use crate::error::ConfigError;
pub use crate::family::{Constructed, Family};
pub use crate::metrics::CacheStats;
