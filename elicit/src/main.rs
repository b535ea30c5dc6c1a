//! `elicit` CLI: resolve airline booking parameters from partial input.
//!
//! `fixup` validates a JSON object in one pass and prints either the accepted
//! value or per-field feedback. `ask` runs an interactive session on the
//! terminal. `check` prints the field spec. `init` writes a default config.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use jsonschema::Draft;
use serde_json::Value;
use tracing::debug;

use elicit::airline::{airline_spec, default_flights, load_flights, loose_input_schema};
use elicit::core::types::{Domain, FixupOutcome};
use elicit::error::ElicitError;
use elicit::exit_codes;
use elicit::fixup::compile_fixup;
use elicit::io::asker::LineAsker;
use elicit::io::config::{ElicitConfig, load_config, write_config};
use elicit::io::specifier::specifier_from_config;
use elicit::logging;
use elicit::looping::run_loop;
use elicit::spec::FlowSpec;
use elicit::step::{Session, StepConfig};

#[derive(Parser)]
#[command(
    name = "elicit",
    version,
    about = "Dependency-aware parameter resolution for airline bookings"
)]
struct Cli {
    /// Config file (TOML). Defaults apply when the file does not exist.
    #[arg(long, global = true, default_value = "elicit.toml")]
    config: PathBuf,

    /// Flight schedule (JSON array). The built-in schedule is used if omitted.
    #[arg(long, global = true)]
    flights: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file unless one already exists.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Print fields, their dependencies and the evaluation order.
    Check,
    /// Validate a JSON object and print the outcome.
    Fixup {
        /// Input object as a JSON string.
        #[arg(long, conflicts_with = "input_file", required_unless_present = "input_file")]
        input: Option<String>,
        /// Path to a file holding the input object.
        #[arg(long)]
        input_file: Option<PathBuf>,
    },
    /// Ask for every field on the terminal and print the resolved object.
    Ask {
        /// Seed a field with raw text (`field=value`). Repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let flights = cli.flights.as_deref();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Check => cmd_check(&build_spec(flights)?),
        Command::Fixup { input, input_file } => {
            let raw = match (input, input_file) {
                (Some(input), _) => input,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("read {}", path.display()))?,
                (None, None) => bail!("one of --input or --input-file is required"),
            };
            cmd_fixup(&build_spec(flights)?, &raw)
        }
        Command::Ask { set } => cmd_ask(&build_spec(flights)?, &cli.config, set),
    }
}

fn build_spec(flights: Option<&Path>) -> Result<FlowSpec> {
    let flights = match flights {
        Some(path) => load_flights(path)?,
        None => default_flights(),
    };
    airline_spec(flights).context("build airline spec")
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if config_path.exists() && !force {
        eprintln!("{} already exists; pass --force to overwrite", config_path.display());
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &ElicitConfig::default())
        .with_context(|| format!("write {}", config_path.display()))?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_check(spec: &FlowSpec) -> Result<i32> {
    spec.recheck().context("recheck spec")?;
    for (name, field) in spec.fields() {
        println!(
            "{name}: requires [{}], influenced_by [{}]",
            field.requires.join(", "),
            field.influenced_by.join(", ")
        );
    }
    let order: Vec<&str> = spec.evaluation_fields().map(|(name, _)| name).collect();
    println!("evaluation order: {}", order.join(" -> "));
    Ok(exit_codes::OK)
}

fn cmd_fixup(spec: &FlowSpec, raw: &str) -> Result<i32> {
    let instance: Value = serde_json::from_str(raw).context("parse input json")?;
    validate_schema(&instance, &loose_input_schema())?;
    let input: Domain = serde_json::from_value(instance).context("input must be a json object")?;

    let outcome = compile_fixup(spec).run(&input)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome).context("serialize outcome")?
    );
    Ok(match outcome {
        FixupOutcome::Accepted { .. } => exit_codes::OK,
        FixupOutcome::Rejected { .. } => exit_codes::REJECTED,
    })
}

fn cmd_ask(spec: &FlowSpec, config_path: &Path, set: Vec<(String, String)>) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let step_config = StepConfig::from(&cfg);
    let specifier = specifier_from_config(&cfg.specifier);
    let asker = LineAsker::stdio();

    let mut session = Session::with_provided(spec, set)?;
    let outcome = run_loop(spec, &mut session, &asker, &specifier, &step_config, |step| {
        debug!(?step, "step executed");
    })?;
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.value).context("serialize resolved value")?
    );
    Ok(exit_codes::OK)
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ElicitError>() {
        Some(ElicitError::EmptyOptions { .. }) => exit_codes::REFUSED,
        _ => exit_codes::INVALID,
    }
}

fn validate_schema(instance: &Value, schema: &Value) -> Result<()> {
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .context("compile json schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("schema validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}
