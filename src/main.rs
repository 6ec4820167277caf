// src/main.rs

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use cas_parser::utils::logging;
use cas_parser::{document, parse_document, AppError};

/// Command Line Interface for the CAS statement parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the extracted statement text (pages separated by form feed)
    document: PathBuf,

    /// Write the statement JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Statement passphrase, forwarded to the upstream extraction step
    #[arg(short, long)]
    passphrase: Option<String>,

    /// Print only the validation report
    #[arg(long)]
    validate_only: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Log errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Parse CLI arguments
    let args = Args::parse();

    // 2. Setup logging (RUST_LOG overrides the verbosity flags)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    logging::setup_logging(default_level);
    tracing::debug!("starting with args: {:?}", args);

    // 3. Load the extracted statement text
    let doc = document::load_text_file(&args.document, args.passphrase.as_deref())?;
    tracing::info!(pages = doc.total_pages(), "loaded {}", args.document.display());

    // 4. Parse; structural failure is the only fatal path
    let statement = parse_document(&doc)?;

    // 5. Serialize the requested view
    let json = if args.validate_only {
        serde_json::to_string_pretty(&statement.validation)?
    } else {
        statement.to_json()?
    };

    // 6. Emit
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!("wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    // 7. Summary; validation findings never affect the exit code
    tracing::info!(
        holdings = statement.holdings.len(),
        transactions = statement.transactions.len(),
        errors = statement.validation.error_count(),
        warnings = statement.validation.warning_count(),
        valid = statement.validation.is_valid,
        "done"
    );

    Ok(())
}
