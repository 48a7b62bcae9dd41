use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct XrefConfig {
    pub general: GeneralConfig,
    pub files: FilesConfig,
    pub process: ProcessConfig,
    pub pages: PagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "sqlxref".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilesConfig {
    pub root: PathBuf,
    pub ignore_dirs: Vec<String>,
    pub sql_extensions: Vec<String>,
    pub native_extensions: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignore_dirs: strings(&["RCS", "CVS", ".svn", ".git"]),
            sql_extensions: strings(&["sql", "pkg", "pkb", "pks", "pls"]),
            native_extensions: strings(&["c", "cpp", "h"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessConfig {
    /// Doc association window in lines; the sign is ignored
    pub blind_offset: i64,
    pub parallel: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            blind_offset: 0,
            parallel: true,
        }
    }
}

impl ProcessConfig {
    pub fn blind_offset(&self) -> u32 {
        u32::try_from(self.blind_offset.unsigned_abs()).unwrap_or(u32::MAX)
    }
}

/// Listing pages. `view` also decides whether views are collected at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PagesConfig {
    pub filepath: bool,
    pub file: bool,
    pub view: bool,
    pub package: bool,
    pub package_full: bool,
    pub function: bool,
    pub procedure: bool,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            filepath: true,
            file: true,
            view: false,
            package: true,
            package_full: true,
            function: true,
            procedure: true,
        }
    }
}

impl PagesConfig {
    pub fn is_enabled(&self, page: Page) -> bool {
        match page {
            Page::FilePath => self.filepath,
            Page::File => self.file,
            Page::View => self.view,
            Page::Package => self.package,
            Page::PackageFull => self.package_full,
            Page::Function => self.function,
            Page::Procedure => self.procedure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    FilePath,
    File,
    View,
    Package,
    PackageFull,
    Function,
    Procedure,
}

impl Page {
    pub fn all() -> &'static [Page] {
        &[
            Page::FilePath,
            Page::File,
            Page::View,
            Page::Package,
            Page::PackageFull,
            Page::Function,
            Page::Procedure,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::FilePath => "filepath",
            Page::File => "file",
            Page::View => "view",
            Page::Package => "package",
            Page::PackageFull => "package_full",
            Page::Function => "function",
            Page::Procedure => "procedure",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::FilePath => "File Index (by path)",
            Page::File => "File Index",
            Page::View => "View Index",
            Page::Package => "Package Index",
            Page::PackageFull => "Full Package Listing",
            Page::Function => "Function Index",
            Page::Procedure => "Procedure Index",
        }
    }
}

impl FromStr for Page {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown page '{}'", s))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl XrefConfig {
    /// Problems that don't stop a run but probably aren't intended
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let sql: HashSet<&str> = self.files.sql_extensions.iter().map(String::as_str).collect();
        let mut overlap: Vec<&str> = self
            .files
            .native_extensions
            .iter()
            .map(String::as_str)
            .filter(|ext| sql.contains(ext))
            .collect();
        overlap.sort_unstable();
        overlap.dedup();
        if !overlap.is_empty() {
            warnings.push(format!(
                "extensions listed as both sql and native (treated as sql): {}",
                overlap.join(", ")
            ));
        }
        if self.files.sql_extensions.is_empty() {
            warnings.push("no sql extensions configured; nothing will be extracted".to_string());
        }
        if self.process.blind_offset < 0 {
            warnings.push(format!(
                "negative blind_offset {} used as {}",
                self.process.blind_offset,
                self.process.blind_offset()
            ));
        }
        warnings
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("sqlxref.toml")
}

/// Config file candidates for a project, most specific first
pub fn config_candidates(project: Option<&str>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(name) = project.filter(|n| !n.is_empty()) {
        candidates.push(PathBuf::from(format!("{name}.toml")));
        let lower = format!("{}.toml", name.to_lowercase());
        if !candidates.iter().any(|c| c.as_os_str() == lower.as_str()) {
            candidates.push(PathBuf::from(lower));
        }
    }
    candidates.push(default_config_path());
    candidates
}

/// First existing candidate under `base`
pub fn discover_config(base: &Path, project: Option<&str>) -> Option<PathBuf> {
    config_candidates(project)
        .into_iter()
        .map(|candidate| base.join(candidate))
        .find(|path| path.is_file())
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<XrefConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: XrefConfig = toml::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &XrefConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = XrefConfig::default();
        assert_eq!(config.files.sql_extensions, vec!["sql", "pkg", "pkb", "pks", "pls"]);
        assert_eq!(config.files.native_extensions, vec!["c", "cpp", "h"]);
        assert!(config.files.ignore_dirs.contains(&"CVS".to_string()));
        assert!(!config.pages.view);
        assert!(config.pages.is_enabled(Page::Procedure));
        assert_eq!(config.process.blind_offset(), 0);
        assert!(config.process.parallel);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: XrefConfig = toml::from_str(
            r#"
            [process]
            blind_offset = -4

            [pages]
            view = true
            "#,
        )
        .unwrap();
        assert_eq!(config.process.blind_offset(), 4);
        assert!(config.process.parallel);
        assert!(config.pages.view);
        assert!(config.pages.package);
        assert_eq!(config.general.title, "sqlxref");
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sqlxref.toml");
        let config = XrefConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_discovery_order() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path(), Some("Billing")).is_none());

        std::fs::write(dir.path().join("sqlxref.toml"), "").unwrap();
        assert_eq!(
            discover_config(dir.path(), Some("Billing")).unwrap(),
            dir.path().join("sqlxref.toml")
        );

        std::fs::write(dir.path().join("billing.toml"), "").unwrap();
        assert_eq!(
            discover_config(dir.path(), Some("Billing")).unwrap(),
            dir.path().join("billing.toml")
        );
    }

    #[test]
    fn test_candidates_dedup_lowercase() {
        let candidates = config_candidates(Some("hr"));
        assert_eq!(candidates, vec![PathBuf::from("hr.toml"), PathBuf::from("sqlxref.toml")]);
    }

    #[test]
    fn test_validate_overlap() {
        let mut config = XrefConfig::default();
        config.files.native_extensions.push("sql".to_string());
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("sql"));
    }

    #[test]
    fn test_page_parse() {
        assert_eq!("package_full".parse::<Page>().unwrap(), Page::PackageFull);
        assert_eq!("VIEW".parse::<Page>().unwrap(), Page::View);
        assert!("html".parse::<Page>().is_err());
    }
}
