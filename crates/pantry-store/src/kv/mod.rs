//! Key-value persistence backends.

mod sqlite;

pub use sqlite::SqliteKv;
