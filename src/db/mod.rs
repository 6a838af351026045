//! Database module for the landing store
//!
//! Connection handling, the store trait the loaders write through, and the
//! statement/value types used to build SQL from column lists discovered at runtime.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod statement;
pub mod store;
pub mod table;
pub mod value;

pub use connection::{init_pool, DatabaseConnector, DbConfig, DbPool};
pub use memory::{MemoryStore, StoredRow};
pub use postgres::PostgresStore;
pub use statement::InsertStatement;
pub use store::{ColumnInfo, LandingStore};
pub use table::TableName;
pub use value::SqlValue;
