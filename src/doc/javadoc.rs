//! JavaDoc-style comment scanner
//!
//! Recognises `/** ... */` blocks. Untagged text forms the description,
//! `@view`, `@pkg`/`@package`, `@function` and `@procedure` name the
//! documented object, and `@param <type> <name>` lists parameters. Other
//! tags are ignored. A block is anchored at the line holding its `*/`.

use super::{DocEntry, DocParam, DocScanner};
use crate::symbol::SymbolKind;

#[derive(Debug, Default, Clone, Copy)]
pub struct JavaDocScanner;

impl JavaDocScanner {
    pub fn new() -> Self {
        Self
    }

    fn apply_line(entry: &mut DocEntry, text: &str) {
        let text = text.trim().trim_start_matches('*').trim();
        if text.is_empty() {
            return;
        }

        let Some(tagged) = text.strip_prefix('@') else {
            if !entry.description.is_empty() {
                entry.description.push(' ');
            }
            entry.description.push_str(text);
            return;
        };

        let mut words = tagged.split_whitespace();
        let tag = words.next().unwrap_or_default().to_lowercase();
        let kind = match tag.as_str() {
            "view" => Some(SymbolKind::View),
            "pkg" | "package" => Some(SymbolKind::Package),
            "function" => Some(SymbolKind::Function),
            "procedure" => Some(SymbolKind::Procedure),
            "param" => {
                let first = words.next();
                let second = words.next();
                match (first, second) {
                    (Some(ty), Some(name)) => entry.params.push(DocParam {
                        name: name.to_string(),
                        ty: ty.to_string(),
                    }),
                    (Some(name), None) => entry.params.push(DocParam {
                        name: name.to_string(),
                        ty: String::new(),
                    }),
                    _ => {}
                }
                None
            }
            _ => None,
        };

        if let Some(kind) = kind {
            entry.kind = Some(kind);
            entry.name = words.next().unwrap_or_default().to_string();
        }
    }
}

impl DocScanner for JavaDocScanner {
    fn scan(&self, lines: &[String]) -> Vec<DocEntry> {
        let mut entries = Vec::new();
        let mut open: Option<DocEntry> = None;

        for (idx, raw) in lines.iter().enumerate() {
            let line_no = idx as u32 + 1;

            let body = if open.is_some() {
                raw.as_str()
            } else {
                // `/**/` is an empty plain comment, not a doc opener
                match raw.trim_start().strip_prefix("/**") {
                    Some(rest) if !rest.starts_with('/') => {
                        open = Some(DocEntry::new(line_no));
                        rest
                    }
                    _ => continue,
                }
            };

            let Some(entry) = open.as_mut() else { continue };
            match body.find("*/") {
                Some(end) => {
                    Self::apply_line(entry, &body[..end]);
                    entry.line = line_no;
                    if let Some(done) = open.take() {
                        entries.push(done);
                    }
                }
                None => Self::apply_line(entry, body),
            }
        }

        if let Some(unterminated) = open {
            tracing::debug!(line = unterminated.line, "doc comment never closed, dropping it");
        }

        entries
    }
}
