//! Whitespace-token heuristics for PL/SQL headers
//!
//! Tokens are whatever `split_whitespace` yields; string literals and block
//! comments are not understood. Recognised headers:
//! - `CREATE|REPLACE|FORCE VIEW <name>` anywhere on the line (any case)
//! - `PACKAGE BODY <name>` anywhere on the line (any case)
//! - `FUNCTION <name>` as the first two tokens (keyword in any case)
//! - `PROCEDURE <name>` as the first two tokens (keyword upper case only)
//!
//! Routines only count once a package body is open in the file.

use super::{DeclarationScanner, Header, LineScan, ScanState};
use crate::symbol::SymbolKind;

const COMMENT_MARKERS: [&str; 3] = ["--", "//", "##"];
const VIEW_VERBS: [&str; 3] = ["CREATE", "REPLACE", "FORCE"];

#[derive(Debug, Clone, Copy)]
pub struct HeuristicScanner {
    collect_views: bool,
}

impl Default for HeuristicScanner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl HeuristicScanner {
    /// `collect_views = false` makes view headers invisible to every pass
    pub fn new(collect_views: bool) -> Self {
        Self { collect_views }
    }

    fn scan_views(tokens: &[&str], headers: &mut Vec<Header>) {
        for (idx, pair) in tokens.windows(2).enumerate() {
            let verb = pair[0].to_uppercase();
            if pair[1].eq_ignore_ascii_case("VIEW") && VIEW_VERBS.contains(&verb.as_str()) {
                headers.push(match tokens.get(idx + 2) {
                    Some(name) => Header::named(SymbolKind::View, *name),
                    None => Header::anonymous(SymbolKind::View),
                });
            }
        }
    }

    fn scan_packages(tokens: &[&str], state: &mut ScanState, headers: &mut Vec<Header>) {
        for (idx, triple) in tokens.windows(3).enumerate() {
            if triple[0].eq_ignore_ascii_case("PACKAGE") && triple[1].eq_ignore_ascii_case("BODY") {
                state.open_package();
                headers.push(Header::named(SymbolKind::Package, tokens[idx + 2]));
            }
        }
    }

    fn scan_routine(tokens: &[&str], headers: &mut Vec<Header>) {
        let [keyword, name, ..] = tokens else { return };
        // PROCEDURE is deliberately case-sensitive, FUNCTION is not.
        let kind = if keyword.eq_ignore_ascii_case("FUNCTION") {
            SymbolKind::Function
        } else if *keyword == "PROCEDURE" {
            SymbolKind::Procedure
        } else {
            return;
        };
        let bare = name.split('(').next().unwrap_or_default();
        headers.push(if bare.is_empty() {
            Header::anonymous(kind)
        } else {
            Header::named(kind, bare)
        });
    }
}

impl DeclarationScanner for HeuristicScanner {
    fn is_comment(&self, line: &str) -> bool {
        line.split_whitespace()
            .next()
            .is_some_and(|first| COMMENT_MARKERS.iter().any(|m| first.starts_with(m)))
    }

    fn scan_line(&self, line: &str, state: &mut ScanState) -> LineScan {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut headers = Vec::new();

        if self.collect_views {
            Self::scan_views(&tokens, &mut headers);
        }
        Self::scan_packages(&tokens, state, &mut headers);
        if state.package_open() {
            Self::scan_routine(&tokens, &mut headers);
        }

        LineScan { headers }
    }
}
