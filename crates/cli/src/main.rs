//! `marob` — config-driven deduplication of marine observation reports.

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};
use marob_dedup::{DedupConfig, DedupInput, DedupResult};

#[derive(Debug, Parser)]
#[command(name = "marob")]
#[command(about = "Approximate deduplication of marine observation reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run deduplication from a TOML config file
    #[command(after_help = "\
Examples:
  marob run dedup.toml
  marob run dedup.toml --json
  marob run dedup.toml --output result.json
  marob run dedup.toml --csv clusters.csv")]
    Run {
        /// Path to the .dedup.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write per-record assignments (record_id, cluster_id, confidence)
        /// to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Validate a dedup config without running
    #[command(after_help = "\
Examples:
  marob validate dedup.toml")]
    Validate {
        /// Path to the .dedup.toml config file
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn config(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_INVALID_CONFIG,
            message: msg.into(),
            hint: None,
        }
    }

    fn runtime(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_RUNTIME,
            message: msg.into(),
            hint: None,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(&e));
        }
    };

    let result = match cli.command {
        Commands::Run {
            config,
            json,
            output,
            csv,
        } => cmd_run(&config, json, output.as_deref(), csv.as_deref()),
        Commands::Validate { config } => cmd_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            eprintln!("error: {message}");
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

/// --help and --version arrive as clap "errors" but exit clean.
fn parse_exit_code(e: &clap::Error) -> u8 {
    use clap::error::ErrorKind;
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_USAGE,
    }
}

fn load_config(config_path: &Path) -> Result<DedupConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;
    DedupConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))
}

fn cmd_run(
    config_path: &Path,
    json_output: bool,
    output_file: Option<&Path>,
    csv_file: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    // Resolve the input file relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input_path = base_dir.join(&config.input.file);
    let csv_data = std::fs::read_to_string(&input_path)
        .map_err(|e| CliError::runtime(format!("cannot read {}: {e}", input_path.display())))?;

    let records = marob_dedup::load_csv_records(&csv_data, &config.input.id_column)
        .map_err(|e| CliError::runtime(e.to_string()))?;

    let result = marob_dedup::run(&config, &DedupInput { records })
        .map_err(|e| CliError::runtime(e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    if let Some(path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(path) = csv_file {
        write_assignments_csv(path, &result)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} records, {} candidate pairs — {} matches, {} duplicate clusters, {} singletons ({} undefined comparisons)",
        result.meta.config_name,
        s.records,
        s.candidate_pairs,
        s.matches,
        s.clusters,
        s.singletons,
        s.undefined_comparisons,
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    eprintln!(
        "ok: '{}' — {} fields, {} blocking, {} classifier",
        config.name,
        config.fields.len(),
        config.blocking.label(),
        config.classifier.label(),
    );
    Ok(())
}

/// One row per input record; singleton confidence stays empty.
fn write_assignments_csv(path: &Path, result: &DedupResult) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;

    writer
        .write_record(["record_id", "cluster_id", "confidence"])
        .map_err(|e| CliError::runtime(e.to_string()))?;

    for a in &result.assignments {
        let cluster_id = a.cluster_id.to_string();
        let confidence = a.confidence.map(|c| c.to_string()).unwrap_or_default();
        writer
            .write_record([a.record_id.as_str(), cluster_id.as_str(), confidence.as_str()])
            .map_err(|e| CliError::runtime(e.to_string()))?;
    }

    writer.flush().map_err(|e| CliError::runtime(e.to_string()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
