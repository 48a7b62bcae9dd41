//! Index and where-used listings
//!
//! Each listing page can be switched off in `[pages]`. Within a page,
//! entries are ordered by upper-cased name; ties keep catalog order.

use crate::catalog::{Catalog, Declaration, SourceFile, SymbolRef};
use crate::config::{Page, PagesConfig};
use crate::symbol::SymbolKind;
use crate::ui::ListingRow;
use std::path::Path;

pub const NO_USE: &str = "no use found";

/// A rendered listing page
#[derive(Debug, Clone)]
pub struct Listing {
    pub page: Page,
    pub rows: Vec<ListingRow>,
}

impl Listing {
    pub fn title(&self) -> &'static str {
        self.page.title()
    }
}

/// Where-used entries of one symbol in one referencing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    pub path: String,
    pub lines: Vec<u32>,
}

/// `path` with `root` stripped, or unchanged when it lies elsewhere
pub fn relative_path(root: &Path, path: &str) -> String {
    let full = Path::new(path);
    full.strip_prefix(root)
        .unwrap_or(full)
        .to_string_lossy()
        .into_owned()
}

/// Group `(path, line)` usages by file.
///
/// Files are ordered by upper-cased relative path; lines keep the order
/// they were recorded in.
pub fn usage_rows<'u>(root: &Path, usages: impl IntoIterator<Item = (&'u str, u32)>) -> Vec<UsageRow> {
    let mut rows: Vec<UsageRow> = Vec::new();
    for (path, line) in usages {
        let path = relative_path(root, path);
        match rows.iter_mut().find(|r| r.path == path) {
            Some(row) => row.lines.push(line),
            None => rows.push(UsageRow { path, lines: vec![line] }),
        }
    }
    rows.sort_by_cached_key(|r| r.path.to_uppercase());
    rows
}

pub struct Report<'a> {
    catalog: &'a Catalog,
    root: &'a Path,
    pages: &'a PagesConfig,
}

impl<'a> Report<'a> {
    pub fn new(catalog: &'a Catalog, root: &'a Path, pages: &'a PagesConfig) -> Self {
        Self { catalog, root, pages }
    }

    /// Every enabled page, in page order
    pub fn listings(&self) -> Vec<Listing> {
        Page::all().iter().filter_map(|p| self.listing(*p)).collect()
    }

    /// One page, or `None` when it is switched off
    pub fn listing(&self, page: Page) -> Option<Listing> {
        if !self.pages.is_enabled(page) {
            return None;
        }
        let rows = match page {
            Page::FilePath => self.file_rows(|f| self.relative(&f.key())),
            Page::File => self.file_rows(SourceFile::file_name),
            Page::View => self.symbol_rows(SymbolKind::View),
            Page::Package => self.symbol_rows(SymbolKind::Package),
            Page::Function => self.symbol_rows(SymbolKind::Function),
            Page::Procedure => self.symbol_rows(SymbolKind::Procedure),
            Page::PackageFull => self.package_full_rows(),
        };
        Some(Listing { page, rows })
    }

    /// `pkg.name` for routines, the bare name otherwise
    pub fn display_name(&self, target: SymbolRef) -> String {
        let name = self.catalog.get(target).map(|d| d.name.as_str()).unwrap_or_default();
        match self.catalog.package_of(target) {
            Some(pkg) => format!("{}.{}", pkg.decl.name, name),
            None => name.to_string(),
        }
    }

    fn relative(&self, path: &str) -> String {
        relative_path(self.root, path)
    }

    fn location(&self, decl: &Declaration) -> String {
        let path = self
            .catalog
            .file(decl.file)
            .map(|f| self.relative(&f.key()))
            .unwrap_or_default();
        format!("{}:{}", path, decl.line)
    }

    fn usage_summary(decl: &Declaration) -> String {
        if decl.is_used() {
            format!("{} in {} file(s)", decl.where_used.total(), decl.where_used.file_count())
        } else {
            NO_USE.to_string()
        }
    }

    fn row(&self, name: String, decl: &Declaration) -> ListingRow {
        ListingRow {
            name,
            location: self.location(decl),
            description: decl.short_desc().to_string(),
            used: Self::usage_summary(decl),
        }
    }

    fn file_rows(&self, label: impl Fn(&SourceFile) -> String) -> Vec<ListingRow> {
        let mut rows: Vec<ListingRow> = self
            .catalog
            .files()
            .iter()
            .map(|f| {
                let routines: usize = f.packages.iter().map(|p| p.functions.len() + p.procedures.len()).sum();
                ListingRow {
                    name: label(f),
                    location: f.kind.to_string(),
                    description: format!(
                        "{} views, {} packages, {} routines",
                        f.views.len(),
                        f.packages.len(),
                        routines
                    ),
                    used: String::new(),
                }
            })
            .collect();
        rows.sort_by_cached_key(|r| r.name.to_uppercase());
        rows
    }

    fn symbol_rows(&self, kind: SymbolKind) -> Vec<ListingRow> {
        let mut rows: Vec<ListingRow> = self
            .catalog
            .symbols()
            .into_iter()
            .filter(|(_, d)| d.kind == kind)
            .map(|(target, decl)| self.row(self.display_name(target), decl))
            .collect();
        rows.sort_by_cached_key(|r| Self::sort_name(r, kind));
        rows
    }

    /// Routines sort by their own name, not the `pkg.` prefix
    fn sort_name(row: &ListingRow, kind: SymbolKind) -> String {
        let name = if kind.is_routine() {
            row.name.rsplit_once('.').map(|(_, n)| n).unwrap_or(&row.name)
        } else {
            &row.name
        };
        name.to_uppercase()
    }

    fn package_full_rows(&self) -> Vec<ListingRow> {
        let mut packages: Vec<_> = self.catalog.packages().collect();
        packages.sort_by_cached_key(|p| p.decl.name.to_uppercase());

        let mut rows = Vec::new();
        for pkg in packages {
            rows.push(self.row(pkg.decl.name.clone(), &pkg.decl));
            for kind in [SymbolKind::Function, SymbolKind::Procedure] {
                let mut routines: Vec<&Declaration> = pkg.routines(kind).iter().collect();
                routines.sort_by_cached_key(|r| r.name.to_uppercase());
                for routine in routines {
                    rows.push(self.row(format!("  {} {}", kind, routine.name), routine));
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FileKind;
    use crate::extract::SymbolExtractor;
    use crate::linker::UsageResolver;
    use crate::scanner::HeuristicScanner;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn build(files: &[(&str, FileKind, &[&str])]) -> Catalog {
        let scanner = HeuristicScanner::default();
        let mut catalog = Catalog::new();
        let mut source: HashMap<PathBuf, Vec<String>> = HashMap::new();
        for (path, kind, text) in files {
            let lines: Vec<String> = text.iter().map(|s| s.to_string()).collect();
            let idx = catalog.add_file(*path, *kind);
            SymbolExtractor::new(&scanner, 0).extract(&mut catalog, idx, &lines, &[]);
            source.insert(PathBuf::from(path), lines);
        }
        UsageResolver::new(&scanner).parallel(false).resolve(&mut catalog, &source);
        catalog
    }

    fn sample() -> Catalog {
        build(&[
            (
                "/src/pkgs/zeta.pkb",
                FileKind::Sql,
                &["PACKAGE BODY zeta IS", "PROCEDURE run IS", "FUNCTION calc RETURN NUMBER IS"],
            ),
            ("/src/pkgs/alpha.pkb", FileKind::Sql, &["PACKAGE BODY Alpha IS", "FUNCTION Beta RETURN NUMBER"]),
            ("/src/app/main.c", FileKind::Native, &["exec sql call zeta.run;", "", "zeta.run();"]),
        ])
    }

    #[test]
    fn test_packages_sorted_ignoring_case() {
        let catalog = sample();
        let pages = PagesConfig::default();
        let report = Report::new(&catalog, Path::new("/src"), &pages);

        let listing = report.listing(Page::Package).unwrap();
        let names: Vec<&str> = listing.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "zeta"]);
        assert_eq!(listing.rows[0].used, NO_USE);
        assert_eq!(listing.rows[1].location, "pkgs/zeta.pkb:1");
        assert_eq!(listing.rows[1].used, "2 in 1 file(s)");
    }

    #[test]
    fn test_routine_listing_sorts_by_routine_name() {
        let catalog = sample();
        let pages = PagesConfig::default();
        let report = Report::new(&catalog, Path::new("/src"), &pages);

        let functions = report.listing(Page::Function).unwrap();
        let names: Vec<&str> = functions.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha.Beta", "zeta.calc"]);
    }

    #[test]
    fn test_disabled_pages_are_skipped() {
        let catalog = sample();
        let pages = PagesConfig::default();
        let report = Report::new(&catalog, Path::new("/src"), &pages);

        assert!(report.listing(Page::View).is_none());
        let listed: Vec<Page> = report.listings().iter().map(|l| l.page).collect();
        assert_eq!(listed.len(), Page::all().len() - 1);
        assert!(!listed.contains(&Page::View));
    }

    #[test]
    fn test_file_listings() {
        let catalog = sample();
        let pages = PagesConfig::default();
        let report = Report::new(&catalog, Path::new("/src"), &pages);

        let by_path = report.listing(Page::FilePath).unwrap();
        let paths: Vec<&str> = by_path.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(paths, vec!["app/main.c", "pkgs/alpha.pkb", "pkgs/zeta.pkb"]);

        let by_name = report.listing(Page::File).unwrap();
        let names: Vec<&str> = by_name.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.pkb", "main.c", "zeta.pkb"]);
    }

    #[test]
    fn test_package_full_nests_routines() {
        let catalog = sample();
        let pages = PagesConfig::default();
        let report = Report::new(&catalog, Path::new("/src"), &pages);

        let full = report.listing(Page::PackageFull).unwrap();
        let names: Vec<&str> = full.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Alpha", "  function Beta", "zeta", "  function calc", "  procedure run"]
        );
    }

    #[test]
    fn test_usage_rows_sorted_ignoring_case() {
        let usages = [
            ("/src/b/x.sql", 4),
            ("/src/A/y.sql", 9),
            ("/src/b/x.sql", 2),
            ("/elsewhere/z.c", 1),
        ];
        let rows = usage_rows(Path::new("/src"), usages);
        let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/elsewhere/z.c", "A/y.sql", "b/x.sql"]);
        assert_eq!(rows[2].lines, vec![4, 2]);
    }

    #[test]
    fn test_where_used_relative_paths() {
        let catalog = sample();
        let pages = PagesConfig::default();
        let report = Report::new(&catalog, Path::new("/src"), &pages);

        let run = catalog.find("run", Some(SymbolKind::Procedure))[0];
        assert_eq!(report.display_name(run), "zeta.run");

        let used = &catalog.get(run).unwrap().where_used;
        let usages = used.iter().flat_map(|(path, occs)| occs.iter().map(move |o| (path, o.line)));
        assert_eq!(
            usage_rows(Path::new("/src"), usages),
            vec![UsageRow {
                path: "app/main.c".to_string(),
                lines: vec![1, 3],
            }]
        );
    }
}
