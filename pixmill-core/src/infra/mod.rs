//! Infrastructure adapters binding the collaborator ports to PostgreSQL,
//! Redis, and object storage.

pub mod postgres;
pub mod redis;
pub mod storage;

pub use postgres::PostgresBatchRepository;
pub use redis::{RedisStore, RedisUploadQueue};
pub use storage::{BucketStorage, StorageLayout};
