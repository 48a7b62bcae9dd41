//! Symbol kinds
//!
//! Everything the index knows about maps onto four kinds:
//! - `View`: `CREATE VIEW` declarations
//! - `Package`: `PACKAGE BODY` declarations
//! - `Function` / `Procedure`: routines declared inside a package body

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a declared symbol (also used as the object kind of doc entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    View,
    Package,
    Function,
    Procedure,
}

impl SymbolKind {
    /// Get the string representation of the symbol kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::View => "view",
            SymbolKind::Package => "package",
            SymbolKind::Function => "function",
            SymbolKind::Procedure => "procedure",
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::View,
            SymbolKind::Package,
            SymbolKind::Function,
            SymbolKind::Procedure,
        ]
    }

    /// Routines live inside a package and are matched as `pkg.name`
    pub fn is_routine(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Procedure)
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "view" => Ok(SymbolKind::View),
            "package" | "pkg" => Ok(SymbolKind::Package),
            "function" | "func" | "fn" => Ok(SymbolKind::Function),
            "procedure" | "proc" => Ok(SymbolKind::Procedure),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
