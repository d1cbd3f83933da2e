// Database layer module

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod queries;
pub mod store;

pub use memory::{InMemoryStore, StoreCall, StoreState};
pub use pool::DbPool;
pub use postgres::PgJuryStore;
pub use store::{JuryStore, StoreTransaction};
