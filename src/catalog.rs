//! Symbol catalog - the in-memory cross-reference index
//!
//! The catalog is the single context object every pass works on: the
//! classifier adds files, the extractor adds declarations to them, and the
//! usage resolver appends to where-used maps and hands out identifiers.
//! Nothing is ever removed from it during a run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::doc::DocEntry;
use crate::ids::{IdAllocator, SymbolId};
use crate::symbol::SymbolKind;

/// How a file was classified by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// SQL-like source, scanned for declarations
    Sql,
    /// Other source, only searched for usages
    Native,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Sql => "sql",
            FileKind::Native => "native",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single place a symbol is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Identifier of the referencing file
    pub file_id: SymbolId,
    /// 1-based line number within that file
    pub line: u32,
}

/// Usages of one symbol, grouped by referencing file path.
///
/// Files keep the order they were first discovered in, and occurrences
/// within a file keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhereUsed {
    entries: IndexMap<String, Vec<Occurrence>>,
}

impl WhereUsed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: &str, occurrence: Occurrence) {
        self.entries.entry(path.to_string()).or_default().push(occurrence);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct referencing files
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of recorded occurrences
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn occurrences(&self, path: &str) -> &[Occurrence] {
        self.entries.get(path).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Occurrence])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// A declared view, package, function or procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: SymbolKind,
    /// Name as written at the declaration (parameter list stripped)
    pub name: String,
    /// Index of the declaring file in the catalog
    pub file: usize,
    /// 1-based declaration line
    pub line: u32,
    /// Associated documentation block, if any
    pub doc: Option<DocEntry>,
    /// `UNASSIGNED` until the first usage is recorded
    pub id: SymbolId,
    pub where_used: WhereUsed,
}

impl Declaration {
    pub fn new(kind: SymbolKind, name: impl Into<String>, file: usize, line: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            file,
            line,
            doc: None,
            id: SymbolId::UNASSIGNED,
            where_used: WhereUsed::new(),
        }
    }

    pub fn with_doc(mut self, doc: Option<DocEntry>) -> Self {
        self.doc = doc;
        self
    }

    pub fn is_used(&self) -> bool {
        !self.where_used.is_empty()
    }

    /// Short doc description, empty when undocumented
    pub fn short_desc(&self) -> &str {
        self.doc.as_ref().map(|d| d.short_desc()).unwrap_or("")
    }

    fn record_usage(&mut self, path: &str, occurrence: Occurrence, ids: &mut IdAllocator) -> bool {
        self.where_used.record(path, occurrence);
        if self.id.is_assigned() {
            return false;
        }
        self.id = ids.next();
        true
    }
}

/// A package body and the routines declared inside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    #[serde(flatten)]
    pub decl: Declaration,
    pub functions: Vec<Declaration>,
    pub procedures: Vec<Declaration>,
}

impl Package {
    pub fn new(decl: Declaration) -> Self {
        Self {
            decl,
            functions: Vec::new(),
            procedures: Vec::new(),
        }
    }

    /// Attach a routine; its kind decides which list it lands in
    pub fn add_routine(&mut self, routine: Declaration) {
        match routine.kind {
            SymbolKind::Procedure => self.procedures.push(routine),
            _ => self.functions.push(routine),
        }
    }

    pub fn routines(&self, kind: SymbolKind) -> &[Declaration] {
        match kind {
            SymbolKind::Function => &self.functions,
            SymbolKind::Procedure => &self.procedures,
            _ => &[],
        }
    }
}

/// An indexed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: SymbolId,
    pub path: PathBuf,
    pub kind: FileKind,
    pub views: Vec<Declaration>,
    pub packages: Vec<Package>,
}

impl SourceFile {
    /// Key used in where-used maps for this file
    pub fn key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.key())
    }
}

/// Address of a declaration inside the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    View { file: usize, index: usize },
    Package { file: usize, index: usize },
    Routine { file: usize, package: usize, kind: SymbolKind, index: usize },
}

impl SymbolRef {
    pub fn file(&self) -> usize {
        match *self {
            SymbolRef::View { file, .. }
            | SymbolRef::Package { file, .. }
            | SymbolRef::Routine { file, .. } => file,
        }
    }
}

/// The cross-reference catalog
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Catalog {
    files: Vec<SourceFile>,
    ids: IdAllocator,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a classified file, allocating its identifier
    pub fn add_file(&mut self, path: impl Into<PathBuf>, kind: FileKind) -> usize {
        let id = self.ids.next();
        self.files.push(SourceFile {
            id,
            path: path.into(),
            kind,
            views: Vec::new(),
            packages: Vec::new(),
        });
        self.files.len() - 1
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, index: usize) -> Option<&SourceFile> {
        self.files.get(index)
    }

    pub(crate) fn file_mut(&mut self, index: usize) -> Option<&mut SourceFile> {
        self.files.get_mut(index)
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn get(&self, target: SymbolRef) -> Option<&Declaration> {
        match target {
            SymbolRef::View { file, index } => self.files.get(file)?.views.get(index),
            SymbolRef::Package { file, index } => {
                self.files.get(file)?.packages.get(index).map(|p| &p.decl)
            }
            SymbolRef::Routine { file, package, kind, index } => {
                self.files.get(file)?.packages.get(package)?.routines(kind).get(index)
            }
        }
    }

    fn get_mut(&mut self, target: SymbolRef) -> Option<&mut Declaration> {
        match target {
            SymbolRef::View { file, index } => self.files.get_mut(file)?.views.get_mut(index),
            SymbolRef::Package { file, index } => self
                .files
                .get_mut(file)?
                .packages
                .get_mut(index)
                .map(|p| &mut p.decl),
            SymbolRef::Routine { file, package, kind, index } => {
                let pkg = self.files.get_mut(file)?.packages.get_mut(package)?;
                match kind {
                    SymbolKind::Function => pkg.functions.get_mut(index),
                    SymbolKind::Procedure => pkg.procedures.get_mut(index),
                    _ => None,
                }
            }
        }
    }

    /// The package a routine belongs to
    pub fn package_of(&self, target: SymbolRef) -> Option<&Package> {
        match target {
            SymbolRef::Routine { file, package, .. } => self.files.get(file)?.packages.get(package),
            _ => None,
        }
    }

    /// Append a usage to a symbol's where-used map, allocating its
    /// identifier on the first one. Returns true when an id was issued.
    pub fn record_usage(&mut self, target: SymbolRef, path: &str, occurrence: Occurrence) -> bool {
        // Split borrow: the allocator is not part of any declaration.
        let mut ids = std::mem::take(&mut self.ids);
        let issued = match self.get_mut(target) {
            Some(decl) => decl.record_usage(path, occurrence, &mut ids),
            None => {
                tracing::warn!(?target, "usage recorded for unknown symbol");
                false
            }
        };
        self.ids = ids;
        issued
    }

    /// Every declaration in catalog order: per file, views first, then each
    /// package followed by its functions and procedures.
    pub fn symbols(&self) -> Vec<(SymbolRef, &Declaration)> {
        let mut out = Vec::new();
        for (fi, file) in self.files.iter().enumerate() {
            for (vi, view) in file.views.iter().enumerate() {
                out.push((SymbolRef::View { file: fi, index: vi }, view));
            }
            for (pi, pkg) in file.packages.iter().enumerate() {
                out.push((SymbolRef::Package { file: fi, index: pi }, &pkg.decl));
                for kind in [SymbolKind::Function, SymbolKind::Procedure] {
                    for (ri, routine) in pkg.routines(kind).iter().enumerate() {
                        let r = SymbolRef::Routine { file: fi, package: pi, kind, index: ri };
                        out.push((r, routine));
                    }
                }
            }
        }
        out
    }

    pub fn views(&self) -> impl Iterator<Item = &Declaration> {
        self.files.iter().flat_map(|f| f.views.iter())
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.files.iter().flat_map(|f| f.packages.iter())
    }

    /// Routines of one kind, paired with their owning package
    pub fn routines(&self, kind: SymbolKind) -> impl Iterator<Item = (&Package, &Declaration)> {
        self.packages()
            .flat_map(move |p| p.routines(kind).iter().map(move |r| (p, r)))
    }

    /// Find declarations by case-insensitive name, optionally by kind
    pub fn find(&self, name: &str, kind: Option<SymbolKind>) -> Vec<SymbolRef> {
        self.symbols()
            .into_iter()
            .filter(|(_, d)| kind.is_none_or(|k| d.kind == k) && d.name.eq_ignore_ascii_case(name))
            .map(|(r, _)| r)
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            files: self.files.len(),
            identifiers: self.ids.issued(),
            ..CatalogStats::default()
        };
        for file in &self.files {
            match file.kind {
                FileKind::Sql => stats.sql_files += 1,
                FileKind::Native => stats.native_files += 1,
            }
        }
        for (_, decl) in self.symbols() {
            match decl.kind {
                SymbolKind::View => stats.views += 1,
                SymbolKind::Package => stats.packages += 1,
                SymbolKind::Function => stats.functions += 1,
                SymbolKind::Procedure => stats.procedures += 1,
            }
            if decl.is_used() {
                stats.used_symbols += 1;
                stats.usages += decl.where_used.total();
            }
        }
        stats
    }
}

/// Statistics about a catalog
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStats {
    pub files: usize,
    pub sql_files: usize,
    pub native_files: usize,
    pub views: usize,
    pub packages: usize,
    pub functions: usize,
    pub procedures: usize,
    pub used_symbols: usize,
    pub usages: usize,
    pub identifiers: u64,
}

impl CatalogStats {
    pub fn symbols(&self) -> usize {
        self.views + self.packages + self.functions + self.procedures
    }
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Files: {} (sql: {}, native: {})", self.files, self.sql_files, self.native_files)?;
        writeln!(
            f,
            "  Symbols: {} (views: {}, packages: {}, functions: {}, procedures: {})",
            self.symbols(),
            self.views,
            self.packages,
            self.functions,
            self.procedures
        )?;
        writeln!(f, "  Used: {} symbols, {} usages", self.used_symbols, self.usages)?;
        writeln!(f, "  Identifiers issued: {}", self.identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let a = catalog.add_file("src/a.sql", FileKind::Sql);
        let file = catalog.file_mut(a).unwrap();
        file.views.push(Declaration::new(SymbolKind::View, "orders_v", a, 3));
        let mut pkg = Package::new(Declaration::new(SymbolKind::Package, "billing", a, 10));
        pkg.add_routine(Declaration::new(SymbolKind::Function, "total", a, 12));
        pkg.add_routine(Declaration::new(SymbolKind::Procedure, "post", a, 20));
        file.packages.push(pkg);
        catalog.add_file("src/b.c", FileKind::Native);
        catalog
    }

    #[test]
    fn test_files_get_increasing_ids() {
        let catalog = sample_catalog();
        assert_eq!(catalog.files()[0].id, SymbolId(1));
        assert_eq!(catalog.files()[1].id, SymbolId(2));
        assert_eq!(catalog.ids().last(), SymbolId(2));
    }

    #[test]
    fn test_symbols_in_catalog_order() {
        let catalog = sample_catalog();
        let names: Vec<&str> = catalog.symbols().iter().map(|(_, d)| d.name.as_str()).collect();
        assert_eq!(names, vec!["orders_v", "billing", "total", "post"]);
    }

    #[test]
    fn test_record_usage_allocates_once() {
        let mut catalog = sample_catalog();
        let view = catalog.find("ORDERS_V", Some(SymbolKind::View))[0];
        let occ = Occurrence { file_id: SymbolId(2), line: 7 };

        assert!(catalog.record_usage(view, "src/b.c", occ));
        assert!(!catalog.record_usage(view, "src/b.c", Occurrence { line: 9, ..occ }));

        let decl = catalog.get(view).unwrap();
        assert_eq!(decl.id, SymbolId(3));
        assert_eq!(decl.where_used.total(), 2);
        let lines: Vec<u32> = decl.where_used.occurrences("src/b.c").iter().map(|o| o.line).collect();
        assert_eq!(lines, vec![7, 9]);
    }

    #[test]
    fn test_unused_symbols_stay_unassigned() {
        let catalog = sample_catalog();
        for (_, decl) in catalog.symbols() {
            assert!(!decl.is_used());
            assert!(!decl.id.is_assigned());
        }
    }

    #[test]
    fn test_where_used_keeps_file_discovery_order() {
        let mut used = WhereUsed::new();
        let occ = |line| Occurrence { file_id: SymbolId(1), line };
        used.record("z.sql", occ(1));
        used.record("a.sql", occ(2));
        used.record("z.sql", occ(3));
        let files: Vec<&str> = used.iter().map(|(k, _)| k).collect();
        assert_eq!(files, vec!["z.sql", "a.sql"]);
        assert_eq!(used.file_count(), 2);
        assert_eq!(used.total(), 3);
    }

    #[test]
    fn test_routine_lookup_and_owner() {
        let catalog = sample_catalog();
        let proc_ref = catalog.find("post", Some(SymbolKind::Procedure))[0];
        assert_eq!(catalog.package_of(proc_ref).unwrap().decl.name, "billing");
        assert_eq!(proc_ref.file(), 0);
        assert!(catalog.find("post", Some(SymbolKind::Function)).is_empty());
    }

    #[test]
    fn test_stats() {
        let catalog = sample_catalog();
        let stats = catalog.stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.sql_files, 1);
        assert_eq!(stats.native_files, 1);
        assert_eq!(stats.symbols(), 4);
        assert_eq!(stats.used_symbols, 0);
    }
}
