//! Documentation comments
//!
//! A doc scanner turns a file's raw lines into an ordered list of
//! [`DocEntry`] records. The extractor only relies on the contract here;
//! the comment grammar itself belongs to the scanner implementation.

pub mod javadoc;

pub use javadoc::JavaDocScanner;

use crate::symbol::SymbolKind;
use serde::{Deserialize, Serialize};

/// A documented parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// One documentation block found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocEntry {
    /// Line the block is anchored at (1-based)
    pub line: u32,
    /// Name of the documented object, empty if the block names none
    pub name: String,
    /// Kind of the documented object, if the block declares one
    pub kind: Option<SymbolKind>,
    /// Full description text
    pub description: String,
    /// Parameters in the order they were documented
    pub params: Vec<DocParam>,
}

impl DocEntry {
    pub fn new(line: u32) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// First sentence of the description
    pub fn short_desc(&self) -> &str {
        match self.description.find('.') {
            Some(end) => &self.description[..=end],
            None => &self.description,
        }
    }

    /// True when the block carries no information at all
    pub fn is_default(&self) -> bool {
        self.description.is_empty() && self.name.is_empty() && self.kind.is_none() && self.params.is_empty()
    }

    /// Exact subject match: same kind and case-insensitively equal name
    pub fn names(&self, kind: SymbolKind, name: &str) -> bool {
        self.kind == Some(kind) && self.name.eq_ignore_ascii_case(name)
    }
}

/// Produces doc entries from raw file lines.
pub trait DocScanner: Send + Sync {
    fn scan(&self, lines: &[String]) -> Vec<DocEntry>;
}
