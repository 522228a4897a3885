//! Persistent storage for embedded chunks

mod collection;

pub use collection::SqliteCollection;
