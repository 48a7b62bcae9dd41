//! # sqlxref - cross-reference index for SQL and PL/SQL source trees
//!
//! sqlxref walks a source tree, finds the views, package bodies and package
//! routines declared in it, pairs each with its doc comment and records every
//! place the rest of the tree refers to it.
//!
//! sqlxref provides:
//! - A line-oriented declaration scanner behind a swappable trait
//! - A where-used resolver that can scan files on a thread pool
//! - SQLite persistence and JSON export of the finished catalog
//! - Sorted index and where-used listings for the terminal

pub mod ids;
pub mod symbol;
pub mod catalog;
pub mod doc;
pub mod scanner;
pub mod extract;
pub mod linker;
pub mod classify;
pub mod source;
pub mod indexer;
pub mod report;
pub mod storage;
pub mod ignore;
pub mod ui;
pub mod config;

// Re-exports for convenient access
pub use catalog::{Catalog, Declaration, FileKind, Occurrence, Package, SourceFile, SymbolRef};
pub use ids::{IdAllocator, SymbolId};
pub use indexer::{IndexSummary, Indexer};
pub use storage::SqliteStore;
pub use symbol::SymbolKind;

/// Result type alias for sqlxref operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sqlxref operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Root directory not found: {}", .0.display())]
    RootNotFound(std::path::PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid symbol kind: {0}")]
    InvalidKind(String),
}
