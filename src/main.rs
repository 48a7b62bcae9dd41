//! sqlxref CLI - cross-reference index for SQL and PL/SQL source trees

use clap::{Parser, Subcommand};
use sqlxref::config::{self, Page, XrefConfig};
use sqlxref::report::{self, Report};
use sqlxref::storage::SqliteStore;
use sqlxref::ui::{self, Icons};
use sqlxref::{Indexer, SymbolKind};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sqlxref")]
#[command(version)]
#[command(about = "Cross-reference index for SQL and PL/SQL source trees")]
#[command(long_about = r#"
sqlxref finds the views, package bodies and package routines declared in a
source tree, pairs them with their doc comments and records where each one
is used.

Example usage:
  sqlxref init
  sqlxref index --root ./db --database xref.db
  sqlxref where-used billing.total --database xref.db
  sqlxref list package
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// Config file (default: <project>.toml, then sqlxref.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project name used to discover <project>.toml
    #[arg(short, long)]
    project: Option<String>,

    /// Source root (overrides the config file)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Doc association window in lines (overrides the config file)
    #[arg(short, long, allow_hyphen_values = true)]
    blind_offset: Option<i64>,

    /// Resolve usages on a single thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a source tree
    Index {
        #[command(flatten)]
        opts: ConfigArgs,

        /// Path to the database file
        #[arg(short, long, default_value = "sqlxref.db")]
        database: PathBuf,

        /// Also write the catalog as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Write a config file with the defaults
    Init {
        /// Where to write the config
        #[arg(long, default_value = "sqlxref.toml")]
        path: PathBuf,

        /// Source root to record in the config
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Index a source tree and print its index listings
    List {
        /// Page to print (filepath, file, view, package, package_full, function, procedure)
        page: Option<Page>,

        #[command(flatten)]
        opts: ConfigArgs,
    },

    /// Find where a symbol is used
    WhereUsed {
        /// Symbol name, case-insensitive; `pkg.routine` narrows routines
        name: String,

        /// Path to the database file
        #[arg(short, long, default_value = "sqlxref.db")]
        database: PathBuf,

        /// Filter by symbol kind
        #[arg(short, long)]
        kind: Option<SymbolKind>,
    },

    /// Show statistics about an indexed database
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = "sqlxref.db")]
        database: PathBuf,
    },
}

fn load_settings(args: &ConfigArgs) -> anyhow::Result<XrefConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => config::discover_config(Path::new("."), args.project.as_deref()),
    };
    let mut settings = match path {
        Some(path) => config::load_config(Some(&path))?
            .ok_or_else(|| anyhow::anyhow!("config file not found: {}", path.display()))?,
        None => XrefConfig::default(),
    };

    if let Some(root) = &args.root {
        settings.files.root = root.clone();
    }
    if let Some(offset) = args.blind_offset {
        settings.process.blind_offset = offset;
    }
    if args.sequential {
        settings.process.parallel = false;
    }
    for warning in settings.validate() {
        ui::warn(&warning);
    }
    Ok(settings)
}

fn index(settings: &XrefConfig) -> anyhow::Result<(sqlxref::Catalog, sqlxref::IndexSummary)> {
    let (progress, tx) = ui::ProgressManager::new();
    let outcome = Indexer::new(settings).with_progress(tx).run();
    let (catalog, summary) = match outcome {
        Ok(indexed) => indexed,
        Err(err) => {
            progress.clear();
            return Err(err.into());
        }
    };

    if ui::is_quiet() {
        progress.clear();
    } else {
        let stats = catalog.stats();
        progress.finish_with_summary(summary.elapsed, stats.files, stats.symbols(), stats.usages);
    }

    for path in &summary.skipped {
        ui::warn(&format!("skipped unreadable file {}", path.display()));
    }
    Ok((catalog, summary))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Index { opts, database, json } => {
            let settings = load_settings(&opts)?;
            ui::header(&settings.general.title);
            ui::status(Icons::FOLDER, "Root", &settings.files.root.display().to_string());
            ui::status(Icons::DATABASE, "Database", &database.display().to_string());

            let (catalog, summary) = index(&settings)?;
            let stats = catalog.stats();

            config::ensure_parent_dir(&database)?;
            let mut store = SqliteStore::open(&database)?;
            store.save_catalog(&catalog, &settings.files.root)?;

            if let Some(json_path) = json {
                config::ensure_parent_dir(&json_path)?;
                let file = std::fs::File::create(&json_path)?;
                serde_json::to_writer_pretty(std::io::BufWriter::new(file), &catalog)?;
                ui::info("JSON", &json_path.display().to_string());
            }

            if !ui::is_quiet() {
                println!(
                    "{}",
                    ui::stats_table(&[
                        ("Files", &stats.files.to_string()),
                        ("Views", &stats.views.to_string()),
                        ("Packages", &stats.packages.to_string()),
                        ("Functions", &stats.functions.to_string()),
                        ("Procedures", &stats.procedures.to_string()),
                        ("Documented", &summary.extraction.documented.to_string()),
                        ("Used symbols", &stats.used_symbols.to_string()),
                        ("Usages", &stats.usages.to_string()),
                    ])
                );
            }
            ui::success(&format!("Index saved to {}", database.display()));
        }

        Commands::Init { path, root, force } => {
            let mut settings = XrefConfig::default();
            if let Some(root) = root {
                settings.files.root = root;
            }
            config::write_config(&path, &settings, force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::List { page, opts } => {
            let settings = load_settings(&opts)?;
            let (catalog, _) = index(&settings)?;
            let report = Report::new(&catalog, &settings.files.root, &settings.pages);

            let listings = match page {
                Some(page) => match report.listing(page) {
                    Some(listing) => vec![listing],
                    None => {
                        ui::warn(&format!("page '{}' is disabled in [pages]", page));
                        Vec::new()
                    }
                },
                None => report.listings(),
            };
            for listing in listings {
                ui::section(listing.title());
                if listing.rows.is_empty() {
                    println!("{} {}", Icons::EMPTY, ui::label("nothing to list"));
                } else {
                    println!("{}", ui::listing_table(&listing.rows));
                }
            }
        }

        Commands::WhereUsed { name, database, kind } => {
            let store = SqliteStore::open(&database)?;
            let root = store.root()?.unwrap_or_default();
            let by_kind = |s: &sqlxref::storage::StoredSymbol| kind.is_none_or(|k| s.kind == k);

            // A dotted name is tried whole first, then as `pkg.routine`.
            let mut matches: Vec<_> = store.find_symbols_by_name(&name)?.into_iter().filter(by_kind).collect();
            if matches.is_empty() {
                if let Some((pkg, routine)) = name.split_once('.') {
                    matches = store
                        .find_symbols_by_name(routine)?
                        .into_iter()
                        .filter(by_kind)
                        .filter(|s| s.package.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(pkg)))
                        .collect();
                }
            }

            if matches.is_empty() {
                println!("{} No symbol named '{}'.", Icons::CROSS, name);
                return Ok(());
            }

            for symbol in matches {
                ui::symbol_heading(symbol.kind.as_str(), &symbol.qualified_name());
                let declared = report::relative_path(&root, &symbol.path);
                ui::summary_row("declared", &ui::location(&declared, symbol.line));
                if let Some(desc) = &symbol.description {
                    ui::summary_row("doc", desc);
                }

                let usages = store.where_used(symbol.seq)?;
                let rows = report::usage_rows(&root, usages.iter().map(|u| (u.path.as_str(), u.line)));
                if rows.is_empty() {
                    println!("  {}", ui::unused());
                    continue;
                }
                for row in rows {
                    println!("  {} {}", Icons::FILE, row.path);
                    for line in row.lines {
                        println!("      line {}", line);
                    }
                }
            }
        }

        Commands::Stats { database } => {
            let store = SqliteStore::open(&database)?;
            let stats = store.stats()?;

            println!("{} sqlxref Statistics ({:?})", Icons::STATS, database);
            println!("------------------------------------");
            println!("{}", stats);

            let mut table = ui::TableBuilder::new();
            for kind in SymbolKind::all() {
                let symbols = store.find_symbols_by_kind(*kind)?;
                let unused = symbols.iter().filter(|s| !s.id.is_assigned()).count();
                table.add_row(
                    kind.as_str(),
                    &format!("{} declared, {} with {}", symbols.len(), unused, report::NO_USE),
                );
            }
            println!("{}", table.build());
        }
    }

    Ok(())
}
