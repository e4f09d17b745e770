//! # ee-calc
//!
//! Command-line front end for ee_core. Reads an input document (JSON) for
//! one module, evaluates it, and prints the response envelope.
//!
//! ```text
//! ee-calc example vdrop > vdrop.json
//! ee-calc calc vdrop --input vdrop.json
//! echo '{"kva": 1000, "secondary_v": 400, "percent_z": 5}' | ee-calc calc shortcircuit --format text
//! ```
//!
//! Exit status is 0 on success, 2 when the calculation rejected its input,
//! and 1 for any other error (unreadable file, bad JSON, invalid library).

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use ee_core::calculations::{CalcResponse, CalculationInput, ModuleKind};
use ee_core::config::{load_library_file, Config};
use ee_core::presets::example_input;
use ee_core::{CalcError, CalcResult, LibraryStore};
use tracing::debug;

#[derive(Parser)]
#[command(name = "ee-calc")]
#[command(about = "Low-voltage electrical design calculations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: $XDG_CONFIG_HOME/ee-toolbox/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Property library JSON, overriding the config file
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a calculation
    Calc {
        /// Module id (conduit, vdrop, shortcircuit, pfc, powerquality, pv)
        module: ModuleKind,

        /// Input JSON file; reads stdin when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the worked example input for a module
    Example {
        module: ModuleKind,
    },

    /// Print the active property library
    Library,

    /// List the available modules
    Modules,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        ee_core::logging::init_with_level("debug");
    } else {
        ee_core::logging::init();
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> CalcResult<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Calc { module, input, format } => {
            let store = open_library(&config, cli.library.as_deref())?;
            cmd_calc(&config, &store, module, input.as_deref(), format)
        }
        Commands::Example { module } => {
            print_json(&example_input(module))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Library => {
            let store = open_library(&config, cli.library.as_deref())?;
            print_json(&*store.snapshot())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Modules => {
            for module in ModuleKind::ALL {
                println!("{:<14}{}", module.id(), module.title());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_library(config: &Config, override_path: Option<&Path>) -> CalcResult<LibraryStore> {
    let snapshot = match override_path {
        Some(path) => {
            debug!("Library override {:?}", path);
            load_library_file(path)?
        }
        None => config.load_library()?,
    };
    LibraryStore::new(snapshot)
}

fn read_input(path: Option<&Path>) -> CalcResult<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CalcError::file_error("read", "<stdin>", e.to_string()))?;
            Ok(buffer)
        }
    }
}

fn cmd_calc(
    config: &Config,
    store: &LibraryStore,
    module: ModuleKind,
    input_path: Option<&Path>,
    format: OutputFormat,
) -> CalcResult<ExitCode> {
    let raw = read_input(input_path)?;
    let fields: serde_json::Value = if raw.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&raw).map_err(CalcError::serialization)?
    };

    let mut input = CalculationInput::from_fields(module, fields)?;
    config.settings.apply_defaults(&mut input);
    debug!(module = %module, "Evaluating input");

    let snapshot = store.snapshot();
    let response = input.evaluate(&snapshot);

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Text => print!("{}", render_text(module, &response)),
    }

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CalcError::serialization)?;
    println!("{}", json);
    Ok(())
}

fn render_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(ee_core::units::format_number),
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some("n/a".to_string()),
        _ => None,
    }
}

fn render_text(module: ModuleKind, response: &CalcResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", module.title()));

    match response {
        CalcResponse::Failure { errors } => {
            out.push_str("Errors:\n");
            for error in errors {
                out.push_str(&format!("  - {}\n", error));
            }
        }
        CalcResponse::Success {
            results,
            derivation_steps,
            warnings,
            notes,
            summary,
            snapshot,
        } => {
            out.push_str(&format!("{}\n{}\n", summary, snapshot));

            if let Some(fields) = results.as_object() {
                out.push_str("\nResults:\n");
                for (key, value) in fields {
                    if let Some(text) = render_scalar(value) {
                        out.push_str(&format!("  {:<28}{}\n", key, text));
                    }
                }
            }

            let sections = [
                ("Calculation steps", derivation_steps),
                ("Warnings", warnings),
                ("Notes", notes),
            ];
            for (title, lines) in sections {
                if lines.is_empty() {
                    continue;
                }
                out.push_str(&format!("\n{}:\n", title));
                for line in lines {
                    out.push_str(&format!("  - {}\n", line));
                }
            }
        }
    }
    out
}
