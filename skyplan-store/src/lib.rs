pub mod app_config;
pub mod store;
pub mod memory;
pub mod redis_repo;

pub use app_config::Config;
pub use memory::{MemoryStore, MemoryStores};
pub use redis_repo::{RedisStore, RedisStores};
pub use store::{KeyValueStore, PersistedStore, SessionStores, StoreError, StoreScope};
