//! Identifier allocation
//!
//! Every file and every used symbol gets a numeric handle from a single
//! run-wide counter. `0` is reserved to mean "unassigned".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric handle of a file or symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u64);

impl SymbolId {
    /// Sentinel for "no identifier allocated yet"
    pub const UNASSIGNED: SymbolId = SymbolId(0);

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier source.
///
/// Holding it behind `&mut` is what serializes allocation; the parallel
/// resolver only allocates from its sequential merge step.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identifier. Never returns `UNASSIGNED`.
    pub fn next(&mut self) -> SymbolId {
        self.last += 1;
        SymbolId(self.last)
    }

    /// Most recently issued identifier (`UNASSIGNED` before the first call)
    pub fn last(&self) -> SymbolId {
        SymbolId(self.last)
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> u64 {
        self.last
    }
}
