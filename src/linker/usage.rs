//! Where-used resolution
//!
//! Every file is read a second time and every non-declaration line is
//! searched for every catalogued name. Scanning a file is pure, so files can
//! be scanned on the rayon pool; hits are then merged into the catalog in
//! file order so identifiers come out the same either way.

use crate::catalog::{Catalog, Occurrence, SymbolRef};
use crate::scanner::{DeclarationScanner, ScanState};
use crate::source::LineSource;
use crate::symbol::SymbolKind;
use crate::ui::{ProgressMessage, ProgressPhase};
use crossbeam::channel::Sender;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ResolverStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub lines_scanned: usize,
    pub declaration_lines: usize,
    pub usages: usize,
    pub view_usages: usize,
    pub package_usages: usize,
    pub routine_usages: usize,
    pub identifiers_issued: usize,
}

impl fmt::Display for ResolverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Usage Resolver Stats:")?;
        writeln!(f, "  Files scanned: {}", self.files_scanned)?;
        writeln!(f, "  Files skipped: {}", self.files_skipped)?;
        writeln!(f, "  Lines scanned: {}", self.lines_scanned)?;
        writeln!(f, "  Declaration lines: {}", self.declaration_lines)?;
        writeln!(
            f,
            "  Usages recorded: {} (views: {}, packages: {}, routines: {})",
            self.usages, self.view_usages, self.package_usages, self.routine_usages
        )?;
        writeln!(f, "  Identifiers issued: {}", self.identifiers_issued)
    }
}

/// Upper-cased search text for one symbol
#[derive(Debug, Clone)]
struct Needle {
    target: SymbolRef,
    text: String,
}

#[derive(Debug, Clone)]
struct PackageNeedle {
    package: Needle,
    routines: Vec<Needle>,
}

/// Search texts for the whole catalog, in hit order
#[derive(Debug, Default)]
struct Needles {
    views: Vec<Needle>,
    packages: Vec<PackageNeedle>,
}

impl Needles {
    /// All views of the catalog come before all packages, whichever file
    /// declares them. A line hitting symbols of several files allocates
    /// view ids first.
    fn build(catalog: &Catalog) -> Self {
        let mut needles = Needles::default();
        for (fi, file) in catalog.files().iter().enumerate() {
            for (vi, view) in file.views.iter().enumerate() {
                needles.views.push(Needle {
                    target: SymbolRef::View { file: fi, index: vi },
                    text: view.name.to_uppercase(),
                });
            }
            for (pi, pkg) in file.packages.iter().enumerate() {
                let prefix = format!("{}.", pkg.decl.name.to_uppercase());
                let mut routines = Vec::new();
                for kind in [SymbolKind::Function, SymbolKind::Procedure] {
                    for (ri, routine) in pkg.routines(kind).iter().enumerate() {
                        routines.push(Needle {
                            target: SymbolRef::Routine { file: fi, package: pi, kind, index: ri },
                            text: format!("{prefix}{}", routine.name.to_uppercase()),
                        });
                    }
                }
                needles.packages.push(PackageNeedle {
                    package: Needle {
                        target: SymbolRef::Package { file: fi, index: pi },
                        text: prefix,
                    },
                    routines,
                });
            }
        }
        needles
    }

    fn is_empty(&self) -> bool {
        self.views.is_empty() && self.packages.is_empty()
    }
}

/// One usage found in one file, before it is merged into the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hit {
    target: SymbolRef,
    line: u32,
}

/// Outcome of scanning one file
#[derive(Debug, Default)]
struct FileScan {
    hits: Vec<Hit>,
    lines: usize,
    declaration_lines: usize,
    skipped: bool,
}

pub struct UsageResolver<'a> {
    scanner: &'a dyn DeclarationScanner,
    parallel: bool,
    progress: Option<Sender<ProgressMessage>>,
}

impl<'a> UsageResolver<'a> {
    pub fn new(scanner: &'a dyn DeclarationScanner) -> Self {
        Self {
            scanner,
            parallel: true,
            progress: None,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, tx: Sender<ProgressMessage>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Fill every where-used map in the catalog.
    ///
    /// Declarations are never added here; only where-used maps and
    /// identifiers grow.
    pub fn resolve(&self, catalog: &mut Catalog, source: &dyn LineSource) -> ResolverStats {
        let mut stats = ResolverStats::default();
        let needles = Needles::build(catalog);
        let paths: Vec<PathBuf> = catalog.files().iter().map(|f| f.path.clone()).collect();

        self.notify(ProgressMessage::Started {
            phase: ProgressPhase::Resolving,
            total: paths.len(),
        });

        let scans: Vec<FileScan> = if self.parallel {
            paths
                .par_iter()
                .enumerate()
                .map(|(idx, path)| self.scan_path(idx, path, &needles, source))
                .collect()
        } else {
            paths
                .iter()
                .enumerate()
                .map(|(idx, path)| self.scan_path(idx, path, &needles, source))
                .collect()
        };

        let issued_before = catalog.ids().issued();
        for (idx, scan) in scans.into_iter().enumerate() {
            if scan.skipped {
                stats.files_skipped += 1;
                continue;
            }
            stats.files_scanned += 1;
            stats.lines_scanned += scan.lines;
            stats.declaration_lines += scan.declaration_lines;

            let Some(file) = catalog.file(idx) else { continue };
            let (key, file_id) = (file.key(), file.id);
            for hit in scan.hits {
                let occurrence = Occurrence { file_id, line: hit.line };
                catalog.record_usage(hit.target, &key, occurrence);
                stats.usages += 1;
                match hit.target {
                    SymbolRef::View { .. } => stats.view_usages += 1,
                    SymbolRef::Package { .. } => stats.package_usages += 1,
                    SymbolRef::Routine { .. } => stats.routine_usages += 1,
                }
            }
        }
        stats.identifiers_issued = (catalog.ids().issued() - issued_before) as usize;

        self.notify(ProgressMessage::Finished {
            phase: ProgressPhase::Resolving,
        });
        tracing::info!(
            files = stats.files_scanned,
            skipped = stats.files_skipped,
            usages = stats.usages,
            "usage resolution finished"
        );
        stats
    }

    fn scan_path(&self, idx: usize, path: &Path, needles: &Needles, source: &dyn LineSource) -> FileScan {
        let scan = match source.read_lines(path) {
            Ok(lines) => self.scan_lines(&lines, needles),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable file");
                FileScan {
                    skipped: true,
                    ..FileScan::default()
                }
            }
        };
        self.notify(ProgressMessage::Progress {
            phase: ProgressPhase::Resolving,
            current: idx + 1,
            file: Some(path.display().to_string()),
        });
        scan
    }

    fn scan_lines(&self, lines: &[String], needles: &Needles) -> FileScan {
        let mut scan = FileScan {
            lines: lines.len(),
            ..FileScan::default()
        };
        if needles.is_empty() {
            return scan;
        }

        let mut state = ScanState::new();
        for (idx, line) in lines.iter().enumerate() {
            // Short lines stay in: usages can sit on a line of one token.
            if self.scanner.is_comment(line) {
                continue;
            }
            if self.scanner.scan_line(line, &mut state).is_declaration() {
                scan.declaration_lines += 1;
                continue;
            }

            let line_no = idx as u32 + 1;
            let upper = line.to_uppercase();
            for view in &needles.views {
                if upper.contains(&view.text) {
                    scan.hits.push(Hit { target: view.target, line: line_no });
                }
            }
            for pkg in &needles.packages {
                if upper.contains(&pkg.package.text) {
                    scan.hits.push(Hit { target: pkg.package.target, line: line_no });
                }
                for routine in &pkg.routines {
                    if upper.contains(&routine.text) {
                        scan.hits.push(Hit { target: routine.target, line: line_no });
                    }
                }
            }
        }
        scan
    }

    fn notify(&self, msg: ProgressMessage) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FileKind;
    use crate::extract::SymbolExtractor;
    use crate::ids::SymbolId;
    use crate::scanner::HeuristicScanner;
    use std::collections::HashMap;

    fn assigned_id(catalog: &Catalog, target: SymbolRef) -> Option<SymbolId> {
        catalog.get(target).map(|d| d.id).filter(SymbolId::is_assigned)
    }

    /// Build a catalog from in-memory files: extraction, then resolution
    fn index(files: &[(&str, FileKind, &[(u32, &str)])], parallel: bool) -> Catalog {
        let scanner = HeuristicScanner::default();
        let mut catalog = Catalog::new();
        let mut source: HashMap<PathBuf, Vec<String>> = HashMap::new();

        for (path, kind, entries) in files {
            let len = entries.iter().map(|(n, _)| *n).max().unwrap_or(0);
            let lines: Vec<String> = (1..=len)
                .map(|n| {
                    entries
                        .iter()
                        .find(|(line, _)| *line == n)
                        .map(|(_, text)| text.to_string())
                        .unwrap_or_default()
                })
                .collect();
            let idx = catalog.add_file(*path, *kind);
            SymbolExtractor::new(&scanner, 0).extract(&mut catalog, idx, &lines, &[]);
            source.insert(PathBuf::from(path), lines);
        }

        UsageResolver::new(&scanner).parallel(parallel).resolve(&mut catalog, &source);
        catalog
    }

    fn view_ref(catalog: &Catalog, name: &str) -> SymbolRef {
        catalog.find(name, Some(SymbolKind::View))[0]
    }

    #[test]
    fn test_view_usage_in_other_file() {
        let catalog = index(
            &[
                ("A.sql", FileKind::Sql, &[(3, "CREATE VIEW my_view AS SELECT 1;")]),
                ("B.sql", FileKind::Sql, &[(10, "SELECT * FROM my_view;")]),
            ],
            false,
        );
        let view = catalog.get(view_ref(&catalog, "my_view")).unwrap();

        assert_eq!(view.where_used.file_count(), 1);
        assert!(view.where_used.occurrences("A.sql").is_empty());
        let occ = view.where_used.occurrences("B.sql");
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0].line, 10);
        assert_eq!(occ[0].file_id, catalog.file(1).unwrap().id);
    }

    #[test]
    fn test_matching_ignores_case() {
        let catalog = index(
            &[
                ("a.sql", FileKind::Sql, &[(1, "Create View x as select 1 from dual;")]),
                ("b.sql", FileKind::Sql, &[(1, "select * from X"), (2, "select * from x;")]),
            ],
            false,
        );
        let view = catalog.get(view_ref(&catalog, "X")).unwrap();
        let lines: Vec<u32> = view.where_used.occurrences("b.sql").iter().map(|o| o.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_qualified_routine_and_bare_package() {
        let catalog = index(
            &[
                (
                    "pkg.sql",
                    FileKind::Sql,
                    &[(1, "PACKAGE BODY billing IS"), (2, "FUNCTION total RETURN NUMBER IS")],
                ),
                (
                    "use.sql",
                    FileKind::Sql,
                    &[(4, "x := billing.total(1);"), (7, "billing.reset;")],
                ),
            ],
            false,
        );
        let pkg = catalog.get(catalog.find("billing", Some(SymbolKind::Package))[0]).unwrap();
        let total = catalog.get(catalog.find("total", Some(SymbolKind::Function))[0]).unwrap();

        let pkg_lines: Vec<u32> = pkg.where_used.occurrences("use.sql").iter().map(|o| o.line).collect();
        assert_eq!(pkg_lines, vec![4, 7]);
        let fn_lines: Vec<u32> = total.where_used.occurrences("use.sql").iter().map(|o| o.line).collect();
        assert_eq!(fn_lines, vec![4]);
    }

    #[test]
    fn test_declaration_and_comment_lines_are_not_usages() {
        let catalog = index(
            &[(
                "a.sql",
                FileKind::Sql,
                &[
                    (1, "CREATE VIEW orders_v AS"),
                    (2, "-- orders_v is handy"),
                    (3, "CREATE OR REPLACE VIEW orders_v AS"),
                ],
            )],
            false,
        );
        let views: Vec<_> = catalog.views().collect();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| !v.is_used()));
    }

    #[test]
    fn test_short_lines_count_as_usages() {
        let catalog = index(
            &[
                ("a.sql", FileKind::Sql, &[(1, "CREATE VIEW v_short AS SELECT 1 FROM dual;")]),
                ("b.sql", FileKind::Sql, &[(5, "v_short")]),
            ],
            false,
        );
        let view = catalog.get(view_ref(&catalog, "v_short")).unwrap();
        assert_eq!(view.where_used.occurrences("b.sql")[0].line, 5);
    }

    #[test]
    fn test_native_files_are_searched() {
        let catalog = index(
            &[
                ("a.sql", FileKind::Sql, &[(1, "CREATE VIEW emp_v AS SELECT 1 FROM dual;")]),
                ("main.c", FileKind::Native, &[(12, "EXEC SQL SELECT * FROM emp_v;")]),
            ],
            false,
        );
        let view = catalog.get(view_ref(&catalog, "emp_v")).unwrap();
        assert_eq!(view.where_used.occurrences("main.c").len(), 1);
    }

    #[test]
    fn test_unused_symbols_keep_no_id() {
        let catalog = index(
            &[
                ("a.sql", FileKind::Sql, &[(1, "CREATE VIEW used_v AS"), (2, "CREATE VIEW idle_v AS")]),
                ("b.sql", FileKind::Sql, &[(1, "select * from used_v")]),
            ],
            false,
        );
        let used = view_ref(&catalog, "used_v");
        let idle = view_ref(&catalog, "idle_v");
        assert!(assigned_id(&catalog, used).is_some());
        assert!(assigned_id(&catalog, idle).is_none());
        assert!(!catalog.get(idle).unwrap().is_used());
    }

    #[test]
    fn test_ids_strictly_increase_in_discovery_order() {
        let catalog = index(
            &[
                ("a.sql", FileKind::Sql, &[(1, "CREATE VIEW first_v AS"), (2, "CREATE VIEW second_v AS")]),
                ("b.sql", FileKind::Sql, &[(1, "select * from second_v"), (2, "select * from first_v")]),
            ],
            false,
        );
        let first = assigned_id(&catalog, view_ref(&catalog, "first_v")).unwrap();
        let second = assigned_id(&catalog, view_ref(&catalog, "second_v")).unwrap();
        let file_ids: Vec<SymbolId> = catalog.files().iter().map(|f| f.id).collect();

        assert!(second < first);
        assert!(file_ids.iter().all(|id| *id < second));
    }

    #[test]
    fn test_views_allocate_before_packages_on_one_line() {
        let catalog = index(
            &[
                ("a.pkb", FileKind::Sql, &[(1, "PACKAGE BODY pay IS")]),
                ("b.sql", FileKind::Sql, &[(1, "CREATE VIEW bills_v AS")]),
                ("c.sql", FileKind::Sql, &[(1, "select pay.total(id) from bills_v")]),
            ],
            false,
        );
        let view = assigned_id(&catalog, view_ref(&catalog, "bills_v")).unwrap();
        let pkg = assigned_id(&catalog, catalog.find("pay", Some(SymbolKind::Package))[0]).unwrap();
        assert!(view < pkg);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let files: &[(&str, FileKind, &[(u32, &str)])] = &[
            (
                "a.sql",
                FileKind::Sql,
                &[
                    (1, "CREATE VIEW v1 AS SELECT 1 FROM dual;"),
                    (2, "PACKAGE BODY p IS"),
                    (3, "FUNCTION f RETURN NUMBER IS"),
                    (4, "PROCEDURE q IS"),
                ],
            ),
            ("b.sql", FileKind::Sql, &[(1, "p.q;"), (2, "select * from v1"), (9, "x := p.f;")]),
            ("c.sql", FileKind::Sql, &[(3, "p.f(v1)")]),
            ("d.c", FileKind::Native, &[(1, "/* p.q */")]),
        ];
        let sequential = index(files, false);
        let parallel = index(files, true);

        let seq = serde_json::to_string(&sequential).unwrap();
        let par = serde_json::to_string(&parallel).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let scanner = HeuristicScanner::default();
        let mut catalog = Catalog::new();
        catalog.add_file("missing.sql", FileKind::Sql);
        let source: HashMap<PathBuf, Vec<String>> = HashMap::new();

        let stats = UsageResolver::new(&scanner).resolve(&mut catalog, &source);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_scanned, 0);
    }

    #[test]
    fn test_stats_display() {
        let stats = ResolverStats {
            files_scanned: 3,
            usages: 7,
            ..ResolverStats::default()
        };
        let text = stats.to_string();
        assert!(text.contains("Files scanned: 3"));
        assert!(text.contains("Usages recorded: 7 (views: 0"));
    }
}
