//! Glossary CLI
//!
//! Command-line tool for merging glossary sheets into the translation store,
//! undoing the last merge, and exporting per-language JSON files.

use clap::{Parser, Subcommand};
use glossary_core::export::{
    language_file_name, read_language_file, write_all_file, write_language_file, ALL_FILE_NAME,
};
use glossary_core::report::{missing_translations, visible_changes};
use glossary_core::{
    derive_key, AutoConfirm, ChangeStatus, ChangeSummary, ConfirmPrimary, GlossaryConfig,
    IngestReport, JsonFileBackend, Lang, Pipeline, StoreStats,
};
use log::{LevelFilter, Log, Metadata, Record};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "glossary")]
#[command(about = "Merge English/Japanese/Malay glossary sheets into a translation store", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (JSON)
    #[arg(short, long, global = true, default_value = glossary_core::config::CONFIG_FILE)]
    config: PathBuf,

    /// Store directory, overriding the config
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a sheet into the store
    Ingest {
        /// Spreadsheet, CSV or text file to merge
        #[arg(short, long, conflicts_with = "paste", required_unless_present = "paste")]
        file: Option<PathBuf>,

        /// Pasted text file to merge ("-" reads stdin; combine with --yes)
        #[arg(short, long)]
        paste: Option<PathBuf>,

        /// Use the first column as English without asking
        #[arg(short, long)]
        yes: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore the store as it was before the last merge
    Undo,

    /// Show store statistics
    Stats {
        /// List keys missing a translation
        #[arg(short, long)]
        missing: bool,
    },

    /// Print store entries
    Show {
        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Export one language (en, jp, malay) or all of them to JSON
    Export {
        /// Language code, or "all"
        #[arg(short, long, default_value = "all")]
        lang: String,

        /// Output file (defaults to EN.json, JP.json, Malay.json or all_translations.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace one language with the contents of a JSON file
    Import {
        /// Language code (en, jp, malay)
        #[arg(short, long)]
        lang: Lang,

        /// Flat JSON object of key/text pairs
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List all translation keys
    Keys,

    /// Show the key derived from a phrase
    DeriveKey {
        /// English phrase
        text: String,
    },

    /// Write a config file with default settings
    InitConfig {
        /// Output path for the config file
        #[arg(short, long, default_value = glossary_core::config::CONFIG_FILE)]
        output: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> glossary_core::Result<()> {
    let cli = Cli::parse();
    let config = GlossaryConfig::load(&cli.config)?;
    init_logging(&config, cli.verbose);

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let pipeline = Pipeline::new(JsonFileBackend::new(data_dir));

    match cli.command {
        Commands::Ingest {
            file,
            paste,
            yes,
            json,
        } => cmd_ingest(&pipeline, file, paste, yes || config.auto_confirm_primary, json),
        Commands::Undo => cmd_undo(&pipeline),
        Commands::Stats { missing } => cmd_stats(&pipeline, missing),
        Commands::Show { limit } => cmd_show(&pipeline, limit),
        Commands::Export { lang, output } => cmd_export(&pipeline, &lang, output),
        Commands::Import { lang, file } => cmd_import(&pipeline, lang, &file),
        Commands::Keys => cmd_keys(&pipeline),
        Commands::DeriveKey { text } => {
            println!("{}", derive_key(&text));
            Ok(())
        }
        Commands::InitConfig { output } => cmd_init_config(&output),
    }
}

fn cmd_ingest(
    pipeline: &Pipeline<JsonFileBackend>,
    file: Option<PathBuf>,
    paste: Option<PathBuf>,
    auto_confirm: bool,
    json: bool,
) -> glossary_core::Result<()> {
    let mut confirmer: Box<dyn ConfirmPrimary> = if auto_confirm {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(PromptConfirm)
    };

    let result = match (file, paste) {
        (Some(path), _) => pipeline.ingest_file(&path, confirmer.as_mut()),
        (None, Some(path)) => {
            let text = read_paste_source(&path)?;
            pipeline.ingest_paste(&text, confirmer.as_mut())
        }
        (None, None) => unreachable!("clap requires --file or --paste"),
    };

    let report = match result {
        Err(e) if e.is_cancelled() => {
            println!("Cancelled: the store was not changed.");
            return Ok(());
        }
        other => other?,
    };

    if json {
        print_ingest_json(&report)?;
    } else {
        print_ingest_table(&report);
    }
    Ok(())
}

fn read_paste_source(path: &Path) -> glossary_core::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|e| glossary_core::Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

fn print_ingest_table(report: &IngestReport) {
    let roles = &report.roles;
    let describe = |lang: Lang| match roles.column(lang) {
        Some(col) => format!("column {}", col + 1),
        None => "-".to_string(),
    };
    println!(
        "Columns: English={}, Japanese={}, Malay={}",
        describe(Lang::Primary),
        describe(Lang::Secondary),
        describe(Lang::Tertiary)
    );
    println!();

    let visible = visible_changes(&report.outcome.changes);
    if visible.is_empty() {
        println!("No changes.");
    } else {
        println!("Status\tKey\tEnglish\tJapanese\tMalay");
        println!("{}", "-".repeat(60));
        for change in &visible {
            let status = match change.status {
                ChangeStatus::Added => "added",
                ChangeStatus::Updated => "updated",
                ChangeStatus::Unchanged => "unchanged",
            };
            println!(
                "{}\t{}\t{}\t{}\t{}",
                status,
                change.key,
                or_dash(&change.values.primary),
                or_dash(&change.values.secondary),
                or_dash(&change.values.tertiary)
            );
            if let Some(prev) = &change.previous {
                println!(
                    "  was\t\t{}\t{}\t{}",
                    or_dash(&prev.primary),
                    or_dash(&prev.secondary),
                    or_dash(&prev.tertiary)
                );
            }
        }
    }

    let summary = ChangeSummary::from_outcome(&report.outcome);
    println!();
    println!(
        "{} changes ({} updated, {} added), {} unchanged, {} rows skipped",
        summary.changed(),
        summary.updated,
        summary.added,
        summary.unchanged,
        summary.skipped
    );

    if !report.outcome.duplicates.is_empty() {
        println!("\nWarning: {} keys appear on more than one row (last row wins):", summary.duplicate_keys);
        for dup in &report.outcome.duplicates {
            let rows: Vec<String> = dup.rows.iter().map(|r| (r + 1).to_string()).collect();
            println!("  {} (rows {})", dup.key, rows.join(", "));
        }
    }

    if report.store_written && report.snapshot_taken {
        println!("\nPrevious store saved; run `glossary undo` to revert.");
    }
}

fn print_ingest_json(report: &IngestReport) -> glossary_core::Result<()> {
    let output = serde_json::json!({
        "roles": report.roles,
        "summary": ChangeSummary::from_outcome(&report.outcome),
        "changes": visible_changes(&report.outcome.changes),
        "duplicates": report.outcome.duplicates,
        "storeWritten": report.store_written,
        "snapshotTaken": report.snapshot_taken,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn cmd_undo(pipeline: &Pipeline<JsonFileBackend>) -> glossary_core::Result<()> {
    let store = pipeline.undo()?;
    println!("Restored previous store ({} keys).", store.primary.len());
    Ok(())
}

fn cmd_stats(pipeline: &Pipeline<JsonFileBackend>, missing: bool) -> glossary_core::Result<()> {
    let store = pipeline.current_store()?;
    let stats = StoreStats::compute(&store);

    println!("Total keys:      {}", stats.total_keys);
    println!("Complete keys:   {}", stats.complete_keys);
    println!("Incomplete keys: {}", stats.incomplete_keys);
    println!("Completion:      {}%", stats.completion_percent());
    println!();
    for (lang, count) in &stats.per_language {
        println!("  {:<9} {}", lang.display_name(), count);
    }

    if missing {
        for lang in [Lang::Secondary, Lang::Tertiary] {
            let keys = missing_translations(&store, lang);
            if keys.is_empty() {
                continue;
            }
            println!("\nMissing {} ({}):", lang.display_name(), keys.len());
            for key in keys {
                println!("  {}", key);
            }
        }
    }

    if pipeline.has_backup()? {
        println!("\nUndo snapshot available.");
    }

    Ok(())
}

fn cmd_show(pipeline: &Pipeline<JsonFileBackend>, limit: Option<usize>) -> glossary_core::Result<()> {
    let store = pipeline.current_store()?;
    let total = store.primary.len();

    println!("Key\tEnglish\tJapanese\tMalay");
    println!("{}", "-".repeat(60));

    let row_limit = limit.unwrap_or(total);
    for key in store.keys().take(row_limit) {
        println!(
            "{}\t{}\t{}\t{}",
            key,
            or_dash(store.get(Lang::Primary, key).unwrap_or_default()),
            or_dash(store.get(Lang::Secondary, key).unwrap_or_default()),
            or_dash(store.get(Lang::Tertiary, key).unwrap_or_default())
        );
    }

    if total > row_limit {
        println!("... ({} more rows)", total - row_limit);
    }

    Ok(())
}

fn cmd_export(
    pipeline: &Pipeline<JsonFileBackend>,
    lang: &str,
    output: Option<PathBuf>,
) -> glossary_core::Result<()> {
    let store = pipeline.current_store()?;

    if lang.eq_ignore_ascii_case("all") {
        let path = output.unwrap_or_else(|| PathBuf::from(ALL_FILE_NAME));
        write_all_file(&store, &path)?;
        println!("Exported {} keys to {}", store.primary.len(), path.display());
        return Ok(());
    }

    let lang: Lang = match lang.parse() {
        Ok(l) => l,
        Err(msg) => {
            eprintln!("{}. Supported: en, jp, malay, all", msg);
            std::process::exit(1);
        }
    };
    let path = output.unwrap_or_else(|| PathBuf::from(language_file_name(lang)));
    write_language_file(&store, lang, &path)?;
    println!(
        "Exported {} {} entries to {}",
        store.lang(lang).len(),
        lang.display_name(),
        path.display()
    );

    Ok(())
}

fn cmd_import(pipeline: &Pipeline<JsonFileBackend>, lang: Lang, file: &Path) -> glossary_core::Result<()> {
    let map = read_language_file(file)?;
    let count = map.len();
    pipeline.update_store(|store| {
        *store.lang_mut(lang) = map;
        Ok(())
    })?;

    println!("Loaded {} {} entries from {}", count, lang.display_name(), file.display());
    Ok(())
}

fn cmd_keys(pipeline: &Pipeline<JsonFileBackend>) -> glossary_core::Result<()> {
    let store = pipeline.current_store()?;
    for key in glossary_core::key_list(&store) {
        println!("{}", key);
    }
    Ok(())
}

fn cmd_init_config(output: &Path) -> glossary_core::Result<()> {
    GlossaryConfig::default().save(output)?;
    println!("Created config file: {}", output.display());
    println!();
    println!("Edit the file to change the store location, then run:");
    println!("  glossary --config {} ingest --file <sheet.xlsx>", output.display());
    Ok(())
}

/// Asks on the terminal whether column 0 should be used as English
struct PromptConfirm;

impl ConfirmPrimary for PromptConfirm {
    fn confirm(&mut self, headers: &[String]) -> bool {
        eprintln!("Warning: no \"English\" column in the header row.");
        eprintln!("Columns: {}", headers.join(", "));
        eprint!(
            "Treat the first column ({}) as English? [y/N] ",
            headers.first().map(String::as_str).unwrap_or("column 1")
        );
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Minimal logger writing `[LEVEL] message` lines to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(config: &GlossaryConfig, verbose: u8) {
    let configured = config.log_level.parse().unwrap_or(LevelFilter::Warn);
    let from_flags = match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(configured.max(from_flags));
    }
}
