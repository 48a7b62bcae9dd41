//! Indexing pipeline
//!
//! classify → per-file doc scan and declaration extraction → usage
//! resolution over the whole catalog.

use crate::catalog::{Catalog, FileKind};
use crate::classify::{ClassifyStats, FileClassifier};
use crate::config::XrefConfig;
use crate::doc::{DocScanner, JavaDocScanner};
use crate::extract::{ExtractionResult, SymbolExtractor};
use crate::linker::{ResolverStats, UsageResolver};
use crate::scanner::HeuristicScanner;
use crate::source::{FsSource, LineSource};
use crate::ui::{ProgressMessage, ProgressPhase};
use crate::Result;
use crossbeam::channel::Sender;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What a run did, phase by phase
#[derive(Debug, Clone, Default)]
pub struct IndexSummary {
    pub classify: ClassifyStats,
    pub extraction: ExtractionResult,
    pub resolution: ResolverStats,
    /// Files that could not be read during extraction
    pub skipped: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl fmt::Display for IndexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index Summary:")?;
        writeln!(
            f,
            "  Files: {} sql, {} native, {} ignored",
            self.classify.sql, self.classify.native, self.classify.dropped
        )?;
        writeln!(
            f,
            "  Declarations: {} ({} documented)",
            self.extraction.total(),
            self.extraction.documented
        )?;
        writeln!(f, "  Usages: {}", self.resolution.usages)?;
        writeln!(f, "  Skipped: {}", self.skipped.len())
    }
}

pub struct Indexer<'a> {
    config: &'a XrefConfig,
    docs: Box<dyn DocScanner>,
    progress: Option<Sender<ProgressMessage>>,
}

impl<'a> Indexer<'a> {
    pub fn new(config: &'a XrefConfig) -> Self {
        Self {
            config,
            docs: Box::new(JavaDocScanner),
            progress: None,
        }
    }

    pub fn with_doc_scanner(mut self, docs: Box<dyn DocScanner>) -> Self {
        self.docs = docs;
        self
    }

    pub fn with_progress(mut self, tx: Sender<ProgressMessage>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Index the configured root from disk
    pub fn run(&self) -> Result<(Catalog, IndexSummary)> {
        self.run_with(&FsSource)
    }

    /// Index the configured root, reading file contents through `source`
    pub fn run_with(&self, source: &dyn LineSource) -> Result<(Catalog, IndexSummary)> {
        let started = Instant::now();
        let mut catalog = Catalog::new();
        let mut summary = IndexSummary::default();
        let root = &self.config.files.root;

        self.notify(ProgressMessage::Started {
            phase: ProgressPhase::Classifying,
            total: 0,
        });
        summary.classify = FileClassifier::new(&self.config.files).classify(root, &mut catalog)?;
        self.notify(ProgressMessage::Finished {
            phase: ProgressPhase::Classifying,
        });

        let scanner = HeuristicScanner::new(self.config.pages.view);
        self.extract_all(&mut catalog, &scanner, source, &mut summary);

        let mut resolver = UsageResolver::new(&scanner).parallel(self.config.process.parallel);
        if let Some(tx) = &self.progress {
            resolver = resolver.with_progress(tx.clone());
        }
        summary.resolution = resolver.resolve(&mut catalog, source);
        summary.elapsed = started.elapsed();

        tracing::info!(
            files = catalog.files().len(),
            declarations = summary.extraction.total(),
            usages = summary.resolution.usages,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "indexing finished"
        );
        Ok((catalog, summary))
    }

    fn extract_all(
        &self,
        catalog: &mut Catalog,
        scanner: &HeuristicScanner,
        source: &dyn LineSource,
        summary: &mut IndexSummary,
    ) {
        let sql_files: Vec<(usize, PathBuf)> = catalog
            .files()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FileKind::Sql)
            .map(|(idx, f)| (idx, f.path.clone()))
            .collect();

        self.notify(ProgressMessage::Started {
            phase: ProgressPhase::Extracting,
            total: sql_files.len(),
        });

        let extractor = SymbolExtractor::new(scanner, self.config.process.blind_offset());
        for (n, (idx, path)) in sql_files.into_iter().enumerate() {
            match source.read_lines(&path) {
                Ok(lines) => {
                    let docs = self.docs.scan(&lines);
                    let result = extractor.extract(catalog, idx, &lines, &docs);
                    summary.extraction.merge(result);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable file");
                    self.notify(ProgressMessage::Skipped(path.display().to_string()));
                    summary.skipped.push(path.clone());
                }
            }
            self.notify(ProgressMessage::Progress {
                phase: ProgressPhase::Extracting,
                current: n + 1,
                file: Some(path.display().to_string()),
            });
        }

        self.notify(ProgressMessage::Finished {
            phase: ProgressPhase::Extracting,
        });
    }

    fn notify(&self, msg: ProgressMessage) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(msg);
        }
    }
}
