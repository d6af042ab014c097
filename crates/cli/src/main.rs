// commrec CLI - commission reconciliation and input preparation

mod exit_codes;
mod prep;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commrec_recon::consolidate::ConsolidateColumns;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "commrec")]
#[command(about = "Reconcile expected commissions against billed commissions")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log progress (info level); RUST_LOG overrides
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile orders against commissions and write the result tables
    #[command(after_help = "\
Examples:
  commrec run recon.json
  commrec run recon.json --output results.xlsx
  commrec run recon.json --output results/      # one CSV per table
  commrec run recon.json --json > outcome.json")]
    Run {
        /// Path to the JSON (or .toml) config file
        config: PathBuf,

        /// Output workbook (.xlsx) or directory for CSV files; overrides output_file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the full outcome as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Check a config file and, when the inputs exist, their columns
    #[command(after_help = "\
Examples:
  commrec validate recon.json")]
    Validate {
        /// Path to the JSON (or .toml) config file
        config: PathBuf,
    },

    /// Sum duplicate (provider, locator) rows of a commission export
    #[command(after_help = "\
Examples:
  commrec consolidate commission_exports.xlsx --output consolidated.xlsx
  commrec consolidate exports.csv --output out/ --value-col Amount")]
    Consolidate {
        /// Commission export (CSV or workbook)
        input: PathBuf,

        /// Output workbook (.xlsx) or directory for CSV files
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Sheet to read from a workbook (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long, default_value = "Provider")]
        provider_col: String,

        #[arg(long, default_value = "BookingLocator")]
        locator_col: String,

        #[arg(long, default_value = "BilledCommissionUSD")]
        value_col: String,

        /// Print the validation report as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Aggregate a commission snapshot to one row per booking locator
    #[command(after_help = "\
Examples:
  commrec snapshot commission_snapshot.csv --output commission_snapshot_agg.xlsx")]
    Snapshot {
        /// Snapshot export (CSV or workbook)
        input: PathBuf,

        /// Output workbook (.xlsx) or directory for CSV files
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Sheet to read from a workbook (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Print the aggregated rows as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Clean the confirmation column of an orders export
    #[command(after_help = "\
Examples:
  commrec clean-orders sale_orders.xlsx --column Confirmation --output sale_orders_clean.xlsx")]
    CleanOrders {
        /// Orders export (CSV or workbook)
        input: PathBuf,

        /// Column holding the booking confirmation
        #[arg(long, short = 'c')]
        column: String,

        /// Output workbook (.xlsx) or directory for CSV files
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Sheet to read from a workbook (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Print the cleaning report as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  commrec-recon ", env!("CARGO_PKG_VERSION"),
    )
}

/// Log records go to stderr; stdout is reserved for `--json`.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, output, json } => recon::cmd_run(config, output, json),
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Consolidate {
            input,
            output,
            sheet,
            provider_col,
            locator_col,
            value_col,
            json,
        } => prep::cmd_consolidate(prep::ConsolidateArgs {
            input,
            output,
            sheet,
            columns: ConsolidateColumns {
                provider: provider_col,
                locator: locator_col,
                value: value_col,
            },
            json,
        }),
        Commands::Snapshot { input, output, sheet, json } => {
            prep::cmd_snapshot(input, output, sheet, json)
        }
        Commands::CleanOrders { input, column, output, sheet, json } => {
            prep::cmd_clean_orders(input, column, output, sheet, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
