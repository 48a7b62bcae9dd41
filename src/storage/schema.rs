//! Database schema definitions

/// One row per classified file; `id` is the file's identifier
pub const CREATE_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    seq INTEGER NOT NULL,
    path TEXT NOT NULL,
    kind TEXT NOT NULL
)
"#;

/// Declarations in catalog order. `id` stays 0 for unused symbols.
pub const CREATE_SYMBOLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS symbols (
    seq INTEGER PRIMARY KEY,
    id INTEGER NOT NULL DEFAULT 0,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    file_id INTEGER NOT NULL REFERENCES files(id),
    line INTEGER NOT NULL,
    package_seq INTEGER REFERENCES symbols(seq)
)
"#;

/// Doc block associated with a declaration, if any
pub const CREATE_DOCS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS docs (
    symbol_seq INTEGER PRIMARY KEY REFERENCES symbols(seq),
    line INTEGER NOT NULL,
    name TEXT NOT NULL,
    kind TEXT,
    description TEXT NOT NULL,
    params TEXT NOT NULL
)
"#;

/// Where-used entries; `seq` keeps discovery order
pub const CREATE_USAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS usages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol_seq INTEGER NOT NULL REFERENCES symbols(seq),
    path TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    line INTEGER NOT NULL
)
"#;

/// Run-level settings, e.g. the source root usage paths are relative to
pub const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name COLLATE NOCASE)",
    "CREATE INDEX IF NOT EXISTS idx_symbols_kind ON symbols(kind)",
    "CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_id)",
    "CREATE INDEX IF NOT EXISTS idx_usages_symbol ON usages(symbol_seq)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_FILES_TABLE,
        CREATE_SYMBOLS_TABLE,
        CREATE_DOCS_TABLE,
        CREATE_USAGES_TABLE,
        CREATE_META_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
