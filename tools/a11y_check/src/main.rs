//! a11y_check: run accessibility checks against URLs and keep a local history.

use a11y_core::config::{build_gateway, load_config, DEFAULT_CONFIG_FILE};
use a11y_core::error::CoreError;
use a11y_core::export::gate::ExportFormat;
use a11y_core::ledger::history_csv::render_history_csv;
use a11y_core::ledger::persist::{load_ledger, save_ledger};
use a11y_core::ledger::record::{format_timestamp, CheckRecord};
use a11y_core::session::CheckSession;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "a11y_check")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// History file, overrides `[ledger] path`
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Grant the PDF export capability
    #[arg(long, global = true)]
    pdf: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a page and record the result
    Check {
        url: String,

        /// Export the new record right away (repeatable)
        #[arg(long = "export")]
        exports: Vec<FormatArg>,

        /// Directory for exported reports
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// List recorded checks, newest first
    History {
        #[arg(long, default_value = "text")]
        format: HistoryFormat,
    },

    /// Render a recorded check as a report file
    Export {
        id: String,

        #[arg(long)]
        format: FormatArg,

        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Delete one check from the history
    Remove { id: String },

    /// Delete the whole history
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ExportFormat::HTML,
            FormatArg::Pdf => ExportFormat::PDF,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HistoryFormat {
    Text,
    Json,
    Csv,
}

fn init_logging(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("a11y_check=debug,a11y_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_logging(cli.verbose, &cfg.log.level);

    let ledger_path = cli.ledger.clone().unwrap_or_else(|| cfg.ledger.path.clone());
    let ledger = load_ledger(&ledger_path)
        .with_context(|| format!("loading history {}", ledger_path.display()))?;
    let mut capabilities = cfg.capabilities;
    capabilities.pdf_export |= cli.pdf;
    let session = CheckSession::with_ledger(build_gateway(&cfg.analyzer)?, capabilities, ledger);

    match cli.command {
        Commands::Check { url, exports, out } => {
            let record = tokio::select! {
                r = session.submit_check(&url) => r?,
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, abandoning check");
                    return Err(CoreError::Cancelled.into());
                }
            };
            save_ledger(&ledger_path, &session.snapshot())?;
            print_record(&record);
            for format in exports {
                write_export(&session, record.id(), format.into(), &out)?;
            }
        }

        Commands::History { format } => {
            let summaries = session.list_checks();
            match format {
                HistoryFormat::Text => {
                    if summaries.is_empty() {
                        println!("No checks recorded.");
                    }
                    for s in &summaries {
                        println!(
                            "{}  {}  {} violations, {} warnings  {}",
                            s.id,
                            format_timestamp(s.timestamp),
                            s.total_violations,
                            s.warning_count,
                            s.url
                        );
                    }
                }
                HistoryFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
                HistoryFormat::Csv => print!("{}", render_history_csv(&summaries)?),
            }
        }

        Commands::Export { id, format, out } => {
            write_export(&session, &id, format.into(), &out)?;
        }

        Commands::Remove { id } => {
            session.remove_check(&id)?;
            save_ledger(&ledger_path, &session.snapshot())?;
            println!("Removed {}", id);
        }

        Commands::Clear => {
            session.clear_checks();
            save_ledger(&ledger_path, &session.snapshot())?;
            println!("History cleared.");
        }
    }

    Ok(())
}

fn print_record(record: &CheckRecord) {
    let result = record.result();
    println!("Check {} for {}", record.id(), record.url());
    println!(
        "Total violations: {}  Issues found: {}  Warnings: {}",
        result.total_violations(),
        result.issue_kinds(),
        result.warning_count
    );
    for v in result.ranked_by_severity() {
        println!("  {:>4}  {}", v.count(), v.category());
        println!("        {}", v.remedy());
    }
}

fn write_export(
    session: &CheckSession,
    id: &str,
    format: ExportFormat,
    out: &Path,
) -> anyhow::Result<()> {
    let doc = session.export_check(id, format)?;
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let path = out.join(doc.file_name());
    std::fs::write(&path, &doc.bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} ({})", path.display(), doc.mime_type);
    Ok(())
}
