//! `commrec run` / `commrec validate`: config-driven commission reconciliation.

use std::path::{Path, PathBuf};

use commrec_recon::report::{render_text, summary_table};
use commrec_recon::{ConfigFormat, ReconConfig, ReconError, Side, Table};

use crate::exit_codes::{recon_exit_code, EXIT_RECON_RUNTIME};
use crate::CliError;

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingSheet { .. } => {
                Some("sheet names are matched ignoring case; check orders_sheet / commissions_sheet".to_string())
            }
            ReconError::MissingColumn { .. } => {
                Some("column names are matched after trimming and lowercasing headers".to_string())
            }
            ReconError::MissingConfigKey(_) => {
                Some("run `commrec validate <config>` to check a config file".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Config plus the directory its relative paths resolve against.
struct LoadedConfig {
    config: ReconConfig,
    base_dir: PathBuf,
}

fn load_config(path: &Path) -> Result<LoadedConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        recon_err(EXIT_RECON_RUNTIME, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::parse(&text, ConfigFormat::from_path(path))?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(LoadedConfig { config, base_dir })
}

fn load_side(loaded: &LoadedConfig, side: Side) -> Result<Table, CliError> {
    let location = loaded.config.sources.location(side)?;
    let table = commrec_io::load_location(&loaded.base_dir, &location, &side.to_string())?;
    log::info!("{}: {} rows from {}", side, table.len(), location.file);
    Ok(table)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn cmd_run(config_path: PathBuf, output: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let loaded = load_config(&config_path)?;
    let config = &loaded.config;

    // --output is relative to the working directory, output_file to the config
    let output_path = match (output, &config.output_file) {
        (Some(path), _) => path,
        (None, Some(file)) => loaded.base_dir.join(file),
        (None, None) => {
            return Err(CliError::from(ReconError::MissingConfigKey(vec!["output_file"]))
                .with_hint("set output_file in the config or pass --output"));
        }
    };

    let aliases =
        commrec_io::resolve_alias_map(&loaded.base_dir, config.provider_map_file.as_deref())?;
    let orders = load_side(&loaded, Side::Orders)?;
    let commissions = load_side(&loaded, Side::Commissions)?;

    let outcome = commrec_recon::run(config, &aliases, orders, commissions)?;

    let written = commrec_io::write_tables(&outcome.tables(), &output_path)?;
    for path in &written {
        eprintln!("wrote {}", path.display());
    }

    if json {
        crate::prep::print_json(&outcome)?;
    }

    // Human summary to stderr
    eprint!("{}", render_text(&summary_table(&outcome.summary)));
    let stats = &outcome.stats;
    eprintln!(
        "{} order rows, {} commission rows, {} skipped without locator, {} amounts read as 0",
        stats.order_rows, stats.commission_rows, stats.skipped_missing_key, stats.coerced_amounts,
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let loaded = load_config(&config_path)?;
    let config = &loaded.config;

    commrec_io::resolve_alias_map(&loaded.base_dir, config.provider_map_file.as_deref())?;

    // Schema is only checked when both inputs are reachable
    let reachable = [Side::Orders, Side::Commissions].iter().all(|side| {
        config
            .sources
            .location(*side)
            .map(|l| loaded.base_dir.join(&l.file).is_file())
            .unwrap_or(false)
    });

    if reachable {
        let mut orders = load_side(&loaded, Side::Orders)?;
        let mut commissions = load_side(&loaded, Side::Commissions)?;
        orders.normalize_headers();
        commissions.normalize_headers();
        commrec_recon::check_schema(config, &orders, &commissions)?;
        eprintln!("valid: {} (inputs checked)", config_path.display());
    } else {
        eprintln!("valid: {} (inputs not found, schema not checked)", config_path.display());
    }
    Ok(())
}
