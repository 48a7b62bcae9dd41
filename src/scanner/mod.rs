//! Declaration scanning
//!
//! Declarations are recognised one line at a time, without a grammar. Both
//! the extractor and the usage resolver go through [`DeclarationScanner`],
//! so a stricter lexer can replace [`HeuristicScanner`] without touching
//! either pass.

pub mod heuristic;

pub use heuristic::HeuristicScanner;

use crate::symbol::SymbolKind;

/// A declaration header found on a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub kind: SymbolKind,
    /// Declared name; `None` when the header keyword has nothing after it
    pub name: Option<String>,
}

impl Header {
    pub fn named(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
        }
    }

    pub fn anonymous(kind: SymbolKind) -> Self {
        Self { kind, name: None }
    }
}

/// Per-file state carried from line to line
#[derive(Debug, Default, Clone)]
pub struct ScanState {
    package_open: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a package body header has been seen in this file
    pub fn package_open(&self) -> bool {
        self.package_open
    }

    pub(crate) fn open_package(&mut self) {
        self.package_open = true;
    }
}

/// Everything a scanner recognised on one line, in line order
#[derive(Debug, Default, Clone)]
pub struct LineScan {
    pub headers: Vec<Header>,
}

impl LineScan {
    /// A declaration line never counts as a usage
    pub fn is_declaration(&self) -> bool {
        !self.headers.is_empty()
    }
}

/// Recognises declaration headers in raw source lines.
pub trait DeclarationScanner: Send + Sync {
    /// Whether the line is a line comment and must be ignored entirely
    fn is_comment(&self, line: &str) -> bool;

    /// Scan one line, updating the file's scan state
    fn scan_line(&self, line: &str, state: &mut ScanState) -> LineScan;
}
