//! Access to file contents for the scanning passes

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies the raw lines of a file.
///
/// Both passes read through this so tests can feed in-memory trees and the
/// indexer can decide what an unreadable file means.
pub trait LineSource: Sync {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads files from disk. Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl LineSource for FsSource {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect())
    }
}

impl LineSource for HashMap<PathBuf, Vec<String>> {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        self.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not in source map", path.display()))
        })
    }
}
