pub mod connection;
pub mod ledger;
pub mod models;
pub mod ratings;
pub mod setup;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use ledger::{LedgerStore, SqliteLedger};
pub use models::*;
