//! SQLite storage implementation

use super::schema;
use crate::catalog::{Catalog, SymbolRef};
use crate::ids::SymbolId;
use crate::symbol::SymbolKind;
use crate::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SYMBOL_COLUMNS: &str = r#"
    SELECT s.seq, s.id, s.kind, s.name, f.path, s.line, p.name, d.description
    FROM symbols s
    JOIN files f ON f.id = s.file_id
    LEFT JOIN symbols p ON p.seq = s.package_seq
    LEFT JOIN docs d ON d.symbol_seq = s.seq
"#;

/// SQLite-backed storage for a finished catalog
pub struct SqliteStore {
    conn: Connection,
}

/// A declaration as read back from the database
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoredSymbol {
    pub seq: i64,
    pub id: SymbolId,
    pub kind: SymbolKind,
    pub name: String,
    pub path: String,
    pub line: u32,
    /// Owning package for routines
    pub package: Option<String>,
    pub description: Option<String>,
}

impl StoredSymbol {
    /// `pkg.name` for routines, the bare name otherwise
    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(pkg) => format!("{}.{}", pkg, self.name),
            None => self.name.clone(),
        }
    }
}

/// One where-used entry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoredUsage {
    pub path: String,
    pub file_id: SymbolId,
    pub line: u32,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Catalog Operations ==========

    /// Replace the database contents with `catalog`, indexed from `root`.
    ///
    /// Runs in one transaction; on failure the previous contents are kept.
    pub fn save_catalog(&mut self, catalog: &Catalog, root: &Path) -> Result<usize> {
        self.begin_transaction()?;
        match self.write_catalog(catalog, root) {
            Ok(count) => {
                self.commit()?;
                tracing::debug!(symbols = count, "saved catalog");
                Ok(count)
            }
            Err(err) => {
                self.rollback()?;
                Err(err)
            }
        }
    }

    fn write_catalog(&self, catalog: &Catalog, root: &Path) -> Result<usize> {
        self.clear_all()?;
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES ('root', ?1)",
            params![root.to_string_lossy().into_owned()],
        )?;

        for (seq, file) in catalog.files().iter().enumerate() {
            self.conn.execute(
                "INSERT INTO files (id, seq, path, kind) VALUES (?1, ?2, ?3, ?4)",
                params![file.id.0 as i64, seq as i64, file.key(), file.kind.as_str()],
            )?;
        }

        let mut package_seqs: HashMap<(usize, usize), i64> = HashMap::new();
        let symbols = catalog.symbols();
        for (idx, (target, decl)) in symbols.iter().enumerate() {
            let seq = idx as i64 + 1;
            let package_seq = match *target {
                SymbolRef::Package { file, index } => {
                    package_seqs.insert((file, index), seq);
                    None
                }
                SymbolRef::Routine { file, package, .. } => package_seqs.get(&(file, package)).copied(),
                SymbolRef::View { .. } => None,
            };
            let file_id = catalog.file(decl.file).map(|f| f.id.0 as i64).unwrap_or_default();

            self.conn.execute(
                r#"
                INSERT INTO symbols (seq, id, kind, name, file_id, line, package_seq)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    seq,
                    decl.id.0 as i64,
                    decl.kind.as_str(),
                    decl.name,
                    file_id,
                    decl.line,
                    package_seq,
                ],
            )?;

            if let Some(doc) = &decl.doc {
                self.conn.execute(
                    r#"
                    INSERT INTO docs (symbol_seq, line, name, kind, description, params)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        seq,
                        doc.line,
                        doc.name,
                        doc.kind.map(|k| k.as_str()),
                        doc.description,
                        serde_json::to_string(&doc.params)?,
                    ],
                )?;
            }

            for (path, occurrences) in decl.where_used.iter() {
                for occ in occurrences {
                    self.conn.execute(
                        "INSERT INTO usages (symbol_seq, path, file_id, line) VALUES (?1, ?2, ?3, ?4)",
                        params![seq, path, occ.file_id.0 as i64, occ.line],
                    )?;
                }
            }
        }

        Ok(symbols.len())
    }

    /// Source root the saved catalog was indexed from
    pub fn root(&self) -> Result<Option<PathBuf>> {
        let root: Option<String> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'root'", [], |row| row.get(0))
            .optional()?;
        Ok(root.map(PathBuf::from))
    }

    /// Find symbols by name, ignoring case
    pub fn find_symbols_by_name(&self, name: &str) -> Result<Vec<StoredSymbol>> {
        let sql = format!("{SYMBOL_COLUMNS} WHERE s.name = ?1 COLLATE NOCASE ORDER BY s.seq");
        let mut stmt = self.conn.prepare(&sql)?;
        let symbols = stmt
            .query_map([name], Self::row_to_symbol)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    /// Find symbols by kind, in catalog order
    pub fn find_symbols_by_kind(&self, kind: SymbolKind) -> Result<Vec<StoredSymbol>> {
        let sql = format!("{SYMBOL_COLUMNS} WHERE s.kind = ?1 ORDER BY s.seq");
        let mut stmt = self.conn.prepare(&sql)?;
        let symbols = stmt
            .query_map([kind.as_str()], Self::row_to_symbol)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    /// Where-used entries of a symbol in discovery order
    pub fn where_used(&self, symbol_seq: i64) -> Result<Vec<StoredUsage>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, file_id, line FROM usages WHERE symbol_seq = ?1 ORDER BY seq")?;
        let usages = stmt
            .query_map([symbol_seq], |row| {
                Ok(StoredUsage {
                    path: row.get(0)?,
                    file_id: SymbolId(row.get::<_, i64>(1)? as u64),
                    line: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(usages)
    }

    fn row_to_symbol(row: &rusqlite::Row) -> rusqlite::Result<StoredSymbol> {
        let kind_str: String = row.get(2)?;
        let kind: SymbolKind = kind_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(StoredSymbol {
            seq: row.get(0)?,
            id: SymbolId(row.get::<_, i64>(1)? as u64),
            kind,
            name: row.get(3)?,
            path: row.get(4)?,
            line: row.get(5)?,
            package: row.get(6)?,
            description: row.get(7)?,
        })
    }

    // ========== Counts ==========

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn count_files(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM files")
    }

    pub fn count_symbols(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM symbols")
    }

    pub fn count_usages(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM usages")
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Delete all data (for re-indexing)
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM usages", [])?;
        self.conn.execute("DELETE FROM docs", [])?;
        self.conn.execute("DELETE FROM symbols", [])?;
        self.conn.execute("DELETE FROM files", [])?;
        self.conn.execute("DELETE FROM meta", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            files: self.count_files()?,
            symbols: self.count_symbols()?,
            used_symbols: self.count("SELECT COUNT(*) FROM symbols WHERE id <> 0")?,
            documented: self.count("SELECT COUNT(*) FROM docs")?,
            usages: self.count_usages()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub files: usize,
    pub symbols: usize,
    pub used_symbols: usize,
    pub documented: usize,
    pub usages: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Symbols: {}", self.symbols)?;
        writeln!(f, "  Used symbols: {}", self.used_symbols)?;
        writeln!(f, "  Documented: {}", self.documented)?;
        writeln!(f, "  Usages: {}", self.usages)
    }
}
