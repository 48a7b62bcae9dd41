//! Source tree walk and file classification

use crate::catalog::{Catalog, FileKind};
use crate::config::FilesConfig;
use crate::ignore::IgnoreFilter;
use crate::{Error, Result};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub sql: usize,
    pub native: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct FileClassifier {
    ignore: IgnoreFilter,
    sql_extensions: HashSet<String>,
    native_extensions: HashSet<String>,
}

impl FileClassifier {
    pub fn new(files: &FilesConfig) -> Self {
        Self {
            ignore: IgnoreFilter::new(&files.ignore_dirs),
            sql_extensions: files.sql_extensions.iter().cloned().collect(),
            native_extensions: files.native_extensions.iter().cloned().collect(),
        }
    }

    /// Text after the last '.' of the file name, or the whole name
    pub fn extension(path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_str()?;
        Some(name.rsplit('.').next().unwrap_or(name))
    }

    /// Kind of a file by extension; sql wins when both sets list it
    pub fn kind_of(&self, path: &Path) -> Option<FileKind> {
        let ext = Self::extension(path)?;
        if self.sql_extensions.contains(ext) {
            Some(FileKind::Sql)
        } else if self.native_extensions.contains(ext) {
            Some(FileKind::Native)
        } else {
            None
        }
    }

    /// Walk `root` and add every recognised file to the catalog.
    ///
    /// Entries are visited sorted by name so file identifiers are stable
    /// between runs over the same tree.
    pub fn classify(&self, root: &Path, catalog: &mut Catalog) -> Result<ClassifyStats> {
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }

        let ignore = self.ignore.clone();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && ignore.is_ignored(entry.file_name()))
            })
            .build();

        let mut stats = ClassifyStats::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "walk error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            match self.kind_of(path) {
                Some(kind) => {
                    catalog.add_file(path, kind);
                    match kind {
                        FileKind::Sql => stats.sql += 1,
                        FileKind::Native => stats.native += 1,
                    }
                }
                None => stats.dropped += 1,
            }
        }

        tracing::info!(
            root = %root.display(),
            sql = stats.sql,
            native = stats.native,
            dropped = stats.dropped,
            "classified source tree"
        );
        Ok(stats)
    }
}
