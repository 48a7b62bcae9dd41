//! Storage Layer - SQLite-backed persistence
//!
//! A finished catalog is written to SQLite with tables:
//! - files(id, seq, path, kind)
//! - symbols(seq, id, kind, name, file_id, line, package_seq)
//! - docs(symbol_seq, line, name, kind, description, params)
//! - usages(seq, symbol_seq, path, file_id, line)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore, StoredSymbol, StoredUsage};
