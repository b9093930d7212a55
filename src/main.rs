use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codanna_lci::coordinator::{IndexCoordinator, IndexType};
use codanna_lci::{ContentStore, Settings};
use std::path::PathBuf;
use std::sync::Arc;

mod annotations_cmd;

#[derive(Parser)]
#[command(name = "codanna-lci")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-process code-intelligence index engine")]
struct Cli {
    /// Path to a settings.toml, bypassing workspace discovery.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration to a `.code-intelligence` workspace.
    Init {
        #[arg(short, long)]
        force: bool,
    },

    /// Walk a directory and load matching files into the content store.
    Load {
        path: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },

    /// Scan a file's `@lci:` annotation comments and print what was parsed.
    Annotations { path: PathBuf },

    /// Print the resolved configuration.
    Config,

    /// Print coordinator health/status for every index type, or one.
    Status {
        #[arg(value_enum)]
        index: Option<IndexArg>,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum IndexArg {
    Content,
    Symbol,
    CallGraph,
    Reference,
    Trigram,
    Postings,
    Location,
}

impl From<IndexArg> for IndexType {
    fn from(value: IndexArg) -> Self {
        match value {
            IndexArg::Content => IndexType::Content,
            IndexArg::Symbol => IndexType::Symbol,
            IndexArg::CallGraph => IndexType::CallGraph,
            IndexArg::Reference => IndexType::Reference,
            IndexArg::Trigram => IndexType::Trigram,
            IndexArg::Postings => IndexType::Postings,
            IndexArg::Location => IndexType::Location,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path).context("loading configuration")?,
        None => Settings::load().context("loading configuration")?,
    };
    codanna_lci::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => cmd_init(force),
        Commands::Load { path, dry_run } => cmd_load(&settings, &path, dry_run),
        Commands::Annotations { path } => annotations_cmd::run(&path),
        Commands::Config => cmd_config(&settings),
        Commands::Status { index } => cmd_status(&settings, index),
    }
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(".code-intelligence/settings.toml");
    if target.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", target.display());
    }
    Settings::default().save(&target)?;
    println!("wrote {}", target.display());
    Ok(())
}

fn cmd_load(settings: &Settings, path: &PathBuf, dry_run: bool) -> Result<()> {
    use codanna_lci::file_service::fs::RealFileSystem;
    use codanna_lci::file_service::{walker, FileLoader};

    let found = walker::walk(path, &settings.file_service.exclude_patterns, settings.file_service.follow_links);
    println!("found {} file(s) under {}", found.len(), path.display());
    if dry_run {
        for p in &found {
            println!("  {}", p.display());
        }
        return Ok(());
    }

    let store = Arc::new(ContentStore::new());
    let loader = FileLoader::new(
        Arc::new(RealFileSystem),
        store.clone(),
        settings.file_service.max_file_size_bytes,
        settings.file_service.worker_count,
    );
    let (loaded, failed) = loader.batch_load_files(&found);
    let ok = loaded.iter().filter(|id| id.is_some()).count();
    println!("loaded {ok}/{} file(s)", loaded.len());
    for (p, err) in &failed {
        eprintln!("  {}: {err}", p.display());
    }
    Ok(())
}

fn cmd_config(settings: &Settings) -> Result<()> {
    println!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}

fn cmd_status(settings: &Settings, index: Option<IndexArg>) -> Result<()> {
    let coordinator = IndexCoordinator::from_config(&settings.coordinator);
    let types: Vec<IndexType> = match index {
        Some(arg) => vec![arg.into()],
        None => IndexType::ALL.to_vec(),
    };
    for t in types {
        let snapshot = coordinator.snapshot(t);
        println!(
            "{:<10} health={:<10} progress={:>3}% indexing={} updates={}",
            t.to_string(),
            coordinator.health(t).as_str(),
            snapshot.progress,
            snapshot.is_indexing,
            snapshot.update_count,
        );
    }
    Ok(())
}
