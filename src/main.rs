//! lintkeeper - incremental lint runner
//!
//! Lints a project once, or watches it and re-lints changed files while
//! still reporting on every file.
//!
//! Exit codes:
//!   0 - Success (nothing reported that fails the build)
//!   1 - Runtime error (config, unreadable root, report write failure, etc.)
//!   2 - Reported problems fail the build (--fail-on-error / --fail-on-warning)

use anyhow::{Context, Result};
use chrono::Local;
use lintkeeper::analysis::{generate_summary_text, ResultSummary};
use lintkeeper::cli::Args;
use lintkeeper::config::{Config, CONFIG_FILE_NAME};
use lintkeeper::scanner::{diff_snapshots, FileScanner, ScanConfig};
use lintkeeper::{BuildContext, LineRulesEngine, LintEngine, Linter, StoreRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config(&args.root);
    }

    // Initialize logging
    init_logging(&args);

    info!("lintkeeper v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Lint run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .lintkeeper.toml.
fn handle_init_config(root: &Path) -> Result<()> {
    let path = root.join(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            path.display()
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the initial pass and, with --watch, every following pass.
/// Returns the exit code of the last report.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let scanner = FileScanner::new(args.root.clone(), ScanConfig::from(&config.scanner));

    if args.dry_run {
        return handle_dry_run(&scanner);
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| args.root.clone());
    let context = BuildContext::new(output_dir);
    let registry = StoreRegistry::new();

    let linter = Linter::new(config.lint.clone(), context, &registry, || {
        let engine = LineRulesEngine::new(
            args.root.clone(),
            config.rules.clone(),
            config.scanner.ignore_patterns.clone(),
        );
        engine.validate()?;
        Ok::<Arc<dyn LintEngine>, anyhow::Error>(Arc::new(engine))
    })?;

    // Initial pass
    let mut snapshot = scanner.snapshot()?;
    let selected = args
        .files
        .iter()
        .map(|file| scanner.relative_path(file))
        .collect::<Result<Vec<PathBuf>>>()?;
    let initial: Vec<PathBuf> = if selected.is_empty() {
        snapshot.keys().cloned().collect()
    } else {
        selected.clone()
    };

    println!("🔍 Linting {} file(s) in {}", initial.len(), args.root.display());
    linter.schedule(initial);
    let mut exit_code = run_report(&linter).await?;

    if !args.watch {
        return Ok(exit_code);
    }

    println!(
        "\n👀 Watching {} for changes (Ctrl+C to stop)...",
        args.root.display()
    );
    let mut ticker = tokio::time::interval(Duration::from_millis(config.watch.interval_ms));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch mode");
                return Ok(exit_code);
            }
            _ = ticker.tick() => {}
        }

        let current = scanner.snapshot()?;
        let mut changes = diff_snapshots(&snapshot, &current);
        snapshot = current;

        if !selected.is_empty() {
            changes.changed.retain(|path| selected.contains(path));
            changes.removed.retain(|path| selected.contains(path));
        }

        if changes.is_empty() {
            continue;
        }

        println!(
            "\n🔁 [{}] {} changed, {} removed",
            Local::now().format("%H:%M:%S"),
            changes.changed.len(),
            changes.removed.len()
        );

        // Deleted files have no current result
        linter.store().evict(&changes.removed);
        linter.schedule(changes.changed);
        exit_code = run_report(&linter).await?;
    }
}

/// Report on the current results, print them and write the report file.
async fn run_report(linter: &Linter) -> Result<i32> {
    let report = linter.report().await;

    for err in linter.context().take_errors() {
        eprintln!("⚠️  {}", err);
    }

    let Some(ref asset) = report.asset else {
        println!("No lint results yet.");
        return Ok(0);
    };

    if let Some(ref errors) = report.errors {
        eprintln!("{}", errors);
    }
    if let Some(ref warnings) = report.warnings {
        println!("{}", warnings);
    }

    if let Some(path) = asset.generate(linter.context()).await? {
        println!("📝 Report saved to: {}", path.display());
    }

    let summary = ResultSummary::from_results(asset.results());
    println!("📊 {}", generate_summary_text(&summary));

    if report.fails_build() {
        warn!("Reported problems fail the build");
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: list the files that would be linted.
fn handle_dry_run(scanner: &FileScanner) -> Result<i32> {
    println!("\n🔍 Dry run: scanning {}...\n", scanner.root().display());

    let files = scanner.scan()?;

    if files.is_empty() {
        println!("   No matching source files found.");
    } else {
        for file in &files {
            println!("     📄 {} ({} bytes)", file.path.display(), file.size);
        }
        println!("\n   Total: {} files", files.len());
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try the project root
    match Config::load_from_dir(&args.root)? {
        Some(config) => {
            info!("Loaded {} from {}", CONFIG_FILE_NAME, args.root.display());
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
