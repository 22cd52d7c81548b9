mod rows;

use catalog_mirror::{
    ExpanderConfig, GroupCodes, JsonReferenceSource, MirrorContext, MirrorError, MirrorResult,
    ReferenceSource, RowSink, RowSource, expand_all, load_group_codes,
};
use clap::{Arg, ArgAction, Command};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rows::{JsonRowSink, JsonRowSource};

fn cli() -> Command {
    Command::new("catalog-mirror")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate mirror rows for compatible vehicles in a parts catalog")
        .arg(
            Arg::new("reference")
                .long("reference")
                .short('r')
                .help("Reference JSON file or directory of JSON files")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .help("Catalog rows as a JSON array of objects")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Where to write the expanded rows")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("groups")
                .long("groups")
                .short('g')
                .help("JSON object mapping model names to group codes")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON expander configuration; missing fields keep their defaults")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-record-type")
                .long("no-record-type")
                .help("Do not tag rows as Original/Mirror")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .help("Expand rows on all cores")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log skipped entries and other details")
                .action(ArgAction::SetTrue),
        )
}

fn load_config(path: Option<&PathBuf>) -> MirrorResult<ExpanderConfig> {
    let Some(path) = path else {
        return Ok(ExpanderConfig::default());
    };
    let content = fs::read_to_string(path).map_err(|e| MirrorError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| MirrorError::json(path, e))
}

/// Run one step, logging its start and elapsed time
fn phase<T>(name: &str, step: impl FnOnce() -> MirrorResult<T>) -> MirrorResult<T> {
    info!("[START] {}", name);
    let started = Instant::now();
    let value = step()?;
    info!("[DONE] {} in {:.2}s", name, started.elapsed().as_secs_f64());
    Ok(value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Required arguments are enforced by clap
    let reference = matches
        .get_one::<PathBuf>("reference")
        .ok_or("missing --reference")?;
    let input = matches.get_one::<PathBuf>("input").ok_or("missing --input")?;
    let output = matches.get_one::<PathBuf>("output").ok_or("missing --output")?;

    let mut config = load_config(matches.get_one::<PathBuf>("config"))?;
    if matches.get_flag("no-record-type") {
        config.include_record_type = false;
    }
    if matches.get_flag("parallel") {
        config.parallel = true;
    }

    let records = phase("Loading reference data", || {
        JsonReferenceSource::new(reference).load()
    })?;
    info!(records = records.len(), "Reference records loaded");

    let group_codes = match matches.get_one::<PathBuf>("groups") {
        Some(path) => load_group_codes(path)?,
        None => GroupCodes::default(),
    };

    let context = phase("Building indices", || {
        MirrorContext::build(&records, config, group_codes)
    })?;
    info!(pairs = context.index().len(), "Reference index ready");

    let rows = phase("Reading catalog rows", || {
        JsonRowSource::new(input).read()
    })?;
    let expansion = phase("Expanding rows", || expand_all(&rows, &context))?;
    phase("Writing output", || {
        JsonRowSink::new(output).write(&expansion.rows)
    })?;

    info!(
        input = rows.len(),
        output = expansion.rows.len(),
        mirrors = expansion.mirrors,
        path = %output.display(),
        "Catalog expansion finished"
    );
    Ok(())
}
