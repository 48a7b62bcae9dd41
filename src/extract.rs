//! Declaration extraction
//!
//! One forward pass over a SQL file: every view, package body and package
//! routine header becomes a [`Declaration`] in the catalog, paired with the
//! doc block that documents it.

use crate::catalog::{Catalog, Declaration, FileKind, Package};
use crate::doc::DocEntry;
use crate::scanner::{DeclarationScanner, ScanState};
use crate::symbol::SymbolKind;

/// Counts of what one file contributed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionResult {
    pub views: usize,
    pub packages: usize,
    pub functions: usize,
    pub procedures: usize,
    pub documented: usize,
}

impl ExtractionResult {
    pub fn total(&self) -> usize {
        self.views + self.packages + self.functions + self.procedures
    }

    pub fn merge(&mut self, other: ExtractionResult) {
        self.views += other.views;
        self.packages += other.packages;
        self.functions += other.functions;
        self.procedures += other.procedures;
        self.documented += other.documented;
    }
}

/// Pick the doc block for a declaration.
///
/// A block qualifies when it names the declaration (same kind, name equal
/// ignoring case) or sits strictly within `blind_offset` lines of it on
/// either side. `blind_offset == 0` leaves only name matches. When several
/// qualify the last one in `docs` wins.
pub fn associate_doc<'d>(
    docs: &'d [DocEntry],
    kind: SymbolKind,
    name: &str,
    line: u32,
    blind_offset: u32,
) -> Option<&'d DocEntry> {
    let window = i64::from(blind_offset);
    docs.iter().rev().find(|doc| {
        let distance = i64::from(doc.line) - i64::from(line);
        doc.names(kind, name) || (distance != 0 && distance.abs() < window)
    })
}

pub struct SymbolExtractor<'a> {
    scanner: &'a dyn DeclarationScanner,
    blind_offset: u32,
}

impl<'a> SymbolExtractor<'a> {
    pub fn new(scanner: &'a dyn DeclarationScanner, blind_offset: u32) -> Self {
        Self {
            scanner,
            blind_offset,
        }
    }

    /// Scan `lines` of catalog file `file` and attach its declarations.
    ///
    /// Native files and unknown indexes contribute nothing.
    pub fn extract(
        &self,
        catalog: &mut Catalog,
        file: usize,
        lines: &[String],
        docs: &[DocEntry],
    ) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        let Some(source) = catalog.file_mut(file) else {
            tracing::warn!(file, "extraction requested for unknown file");
            return result;
        };
        if source.kind != FileKind::Sql {
            return result;
        }

        let mut state = ScanState::new();
        for (idx, line) in lines.iter().enumerate() {
            if line.split_whitespace().nth(1).is_none() || self.scanner.is_comment(line) {
                continue;
            }
            let line_no = idx as u32 + 1;

            for header in self.scanner.scan_line(line, &mut state).headers {
                let Some(name) = header.name else { continue };
                let doc = associate_doc(docs, header.kind, &name, line_no, self.blind_offset).cloned();
                if doc.is_some() {
                    result.documented += 1;
                }
                let decl = Declaration::new(header.kind, name, file, line_no).with_doc(doc);

                match header.kind {
                    SymbolKind::View => {
                        source.views.push(decl);
                        result.views += 1;
                    }
                    SymbolKind::Package => {
                        source.packages.push(Package::new(decl));
                        result.packages += 1;
                    }
                    SymbolKind::Function | SymbolKind::Procedure => {
                        let Some(package) = source.packages.last_mut() else {
                            tracing::debug!(line = line_no, "routine header outside any package body");
                            continue;
                        };
                        if header.kind == SymbolKind::Function {
                            result.functions += 1;
                        } else {
                            result.procedures += 1;
                        }
                        package.add_routine(decl);
                    }
                }
            }
        }

        tracing::debug!(
            path = %source.path.display(),
            views = result.views,
            packages = result.packages,
            functions = result.functions,
            procedures = result.procedures,
            "extracted declarations"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::HeuristicScanner;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    /// Lines numbered from 1; lines not listed are blank
    fn numbered(entries: &[(u32, &str)], len: u32) -> Vec<String> {
        (1..=len)
            .map(|n| {
                entries
                    .iter()
                    .find(|(line, _)| *line == n)
                    .map(|(_, text)| text.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn doc_at(line: u32) -> DocEntry {
        DocEntry {
            line,
            description: format!("doc at {line}"),
            ..DocEntry::default()
        }
    }

    fn extract(src: &[String], docs: &[DocEntry], blind_offset: u32) -> Catalog {
        let scanner = HeuristicScanner::new(true);
        let mut catalog = Catalog::new();
        let file = catalog.add_file("c.sql", FileKind::Sql);
        SymbolExtractor::new(&scanner, blind_offset).extract(&mut catalog, file, src, docs);
        catalog
    }

    #[test]
    fn test_routines_attach_to_latest_package() {
        let src = numbered(
            &[
                (5, "PACKAGE BODY P1 IS"),
                (10, "FUNCTION f0 RETURN NUMBER IS"),
                (40, "PACKAGE BODY P2 IS"),
                (42, "FUNCTION f1(a NUMBER) RETURN NUMBER IS"),
                (50, "PROCEDURE p1 IS"),
            ],
            60,
        );
        let catalog = extract(&src, &[], 0);
        let packages: Vec<&Package> = catalog.packages().collect();

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].decl.name, "P1");
        assert_eq!(packages[0].decl.line, 5);
        assert_eq!(packages[0].functions[0].name, "f0");
        assert_eq!(packages[1].decl.name, "P2");
        assert_eq!(packages[1].functions.len(), 1);
        assert_eq!(packages[1].functions[0].name, "f1");
        assert_eq!(packages[1].functions[0].line, 42);
        assert_eq!(packages[1].procedures[0].name, "p1");
    }

    #[test]
    fn test_routines_ignored_before_any_package() {
        let src = lines(&["FUNCTION loose RETURN NUMBER IS", "PACKAGE BODY p IS"]);
        let catalog = extract(&src, &[], 0);
        assert_eq!(catalog.routines(SymbolKind::Function).count(), 0);
    }

    #[test]
    fn test_short_and_comment_lines_skipped() {
        let src = lines(&[
            "-- CREATE VIEW commented AS",
            "VIEW",
            "   // PACKAGE BODY nope IS",
            "create view real_one as",
        ]);
        let catalog = extract(&src, &[], 0);
        let views: Vec<&str> = catalog.views().map(|v| v.name.as_str()).collect();
        assert_eq!(views, vec!["real_one"]);
        assert_eq!(catalog.views().next().unwrap().line, 4);
        assert_eq!(catalog.packages().count(), 0);
    }

    #[test]
    fn test_views_not_collected_when_disabled() {
        let scanner = HeuristicScanner::new(false);
        let mut catalog = Catalog::new();
        let file = catalog.add_file("v.sql", FileKind::Sql);
        let src = lines(&["CREATE VIEW v1 AS SELECT 1 FROM dual;"]);
        let result = SymbolExtractor::new(&scanner, 0).extract(&mut catalog, file, &src, &[]);
        assert_eq!(result.total(), 0);
        assert_eq!(catalog.views().count(), 0);
    }

    #[test]
    fn test_native_files_not_extracted() {
        let scanner = HeuristicScanner::default();
        let mut catalog = Catalog::new();
        let file = catalog.add_file("x.c", FileKind::Native);
        let src = lines(&["CREATE VIEW v1 AS SELECT 1 FROM dual;"]);
        let result = SymbolExtractor::new(&scanner, 0).extract(&mut catalog, file, &src, &[]);
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_blind_offset_window() {
        let src = numbered(&[(10, "CREATE VIEW near_v AS")], 12);

        let catalog = extract(&src, &[doc_at(8)], 3);
        let view = catalog.views().next().unwrap();
        assert_eq!(view.doc.as_ref().unwrap().line, 8);

        let catalog = extract(&src, &[doc_at(5)], 3);
        assert!(catalog.views().next().unwrap().doc.is_none());
    }

    #[test]
    fn test_blind_offset_excludes_same_line_and_boundary() {
        let docs = [doc_at(10), doc_at(13), doc_at(7)];
        assert!(associate_doc(&docs, SymbolKind::View, "v", 10, 3).is_none());
        let docs = [doc_at(12)];
        assert_eq!(associate_doc(&docs, SymbolKind::View, "v", 10, 3).unwrap().line, 12);
    }

    #[test]
    fn test_zero_offset_only_name_matches() {
        let named = DocEntry {
            line: 100,
            name: "ORDERS_V".to_string(),
            kind: Some(SymbolKind::View),
            ..DocEntry::default()
        };
        let wrong_kind = DocEntry {
            kind: Some(SymbolKind::Package),
            ..named.clone()
        };
        let docs = [doc_at(9), named.clone(), wrong_kind];
        let found = associate_doc(&docs, SymbolKind::View, "orders_v", 10, 0).unwrap();
        assert_eq!(found, &named);
    }

    #[test]
    fn test_last_qualifying_doc_wins() {
        let named = DocEntry {
            line: 1,
            name: "total".to_string(),
            kind: Some(SymbolKind::Function),
            ..DocEntry::default()
        };
        let docs = [named, doc_at(19)];
        let found = associate_doc(&docs, SymbolKind::Function, "TOTAL", 20, 2).unwrap();
        assert_eq!(found.line, 19);
    }

    #[test]
    fn test_documented_counter() {
        let src = numbered(&[(3, "PACKAGE BODY billing IS"), (6, "FUNCTION total RETURN NUMBER")], 6);
        let scanner = HeuristicScanner::default();
        let mut catalog = Catalog::new();
        let file = catalog.add_file("b.sql", FileKind::Sql);
        let result =
            SymbolExtractor::new(&scanner, 2).extract(&mut catalog, file, &src, &[doc_at(2)]);
        assert_eq!(result.packages, 1);
        assert_eq!(result.functions, 1);
        assert_eq!(result.documented, 1);
    }
}
