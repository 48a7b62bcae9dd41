use std::collections::HashSet;
use std::ffi::OsStr;

/// Directories skipped while walking the source tree.
///
/// Matching is by exact, case-sensitive directory name, so `CVS` skips
/// every `CVS` directory at any depth but not `cvs` or `CVS.old`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    names: HashSet<String>,
}

impl IgnoreFilter {
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.iter().filter(|n| !n.is_empty()).cloned().collect(),
        }
    }

    pub fn is_ignored(&self, dir_name: &OsStr) -> bool {
        dir_name.to_str().is_some_and(|name| self.names.contains(name))
    }
}
