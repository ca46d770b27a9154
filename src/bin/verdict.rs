//! Command-line interface for verdict
//! This binary segments judgment records, rebuilds them, and runs the marker tooling over directories.
//!
//! Usage:
//!   verdict parse `<path>` [--raw]                               - Parse one record file (or raw text)
//!   verdict reconstruct `<path>`                                 - Rebuild text from a parsed record
//!   verdict batch `<input>` `<output>` [--workers `<n>`]           - Parse a directory of records
//!   verdict check `<path>`                                       - Report catalog markers in one record
//!   verdict survey `<dir>`                                       - Tally marker combinations
//!   verdict filter `<input>` `<output>`                            - Move records carrying every marker
//!   verdict prefilter `<input>` `<output>`                         - Copy civil first-instance judgments
//!   verdict sample `<input>` `<output>` --count `<n>` [--seed `<s>`] - Copy a random test set

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use verdict::corpus::record::{read_json, text_of, transform_record};
use verdict::corpus::{
    filter_dir, prefilter_dir, reconstruct_value, sample_files, survey_dir, BatchOptions,
    BatchRunner, FlagCatalog, FlagChecker, PrefilterRules, RecordOptions,
};
use verdict_config::{Loader, VerdictConfig};

type CliResult = Result<(), Box<dyn Error>>;

fn cli() -> Command {
    Command::new("verdict")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Segment court judgments into sections and rebuild them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file layered over the defaults and ./verdict.toml"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Marker catalog JSON used by check, survey and filter"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a record file and print the result")
                .arg(Arg::new("path").help("Record JSON file").required(true).index(1))
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .help("Treat the file as plain judgment text")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("reconstruct")
                .about("Rebuild judgment text from a parsed record")
                .arg(Arg::new("path").help("Parsed JSON file").required(true).index(1)),
        )
        .subcommand(
            Command::new("batch")
                .about("Parse every JSON record file of a directory")
                .arg(Arg::new("input").help("Input directory").required(true).index(1))
                .arg(Arg::new("output").help("Output directory").required(true).index(2))
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .short('w')
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Worker pool size"),
                )
                .arg(
                    Arg::new("delete-source")
                        .long("delete-source")
                        .help("Delete each source once its output is written")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("allow-incomplete")
                        .long("allow-incomplete")
                        .help("Accept parses with empty sections")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report which catalog markers a record contains")
                .arg(Arg::new("path").help("Record JSON file").required(true).index(1)),
        )
        .subcommand(
            Command::new("survey")
                .about("Tally marker combinations across a directory")
                .arg(Arg::new("dir").help("Directory of records").required(true).index(1)),
        )
        .subcommand(
            Command::new("filter")
                .about("Move records that carry every catalog category")
                .arg(Arg::new("input").help("Input directory").required(true).index(1))
                .arg(Arg::new("output").help("Output directory").required(true).index(2)),
        )
        .subcommand(
            Command::new("prefilter")
                .about("Copy records matching the configured case-type conditions")
                .arg(
                    Arg::new("input")
                        .help("Directory tree of raw records")
                        .required(true)
                        .index(1),
                )
                .arg(Arg::new("output").help("Output directory").required(true).index(2)),
        )
        .subcommand(
            Command::new("sample")
                .about("Copy randomly chosen records into a test directory")
                .arg(Arg::new("input").help("Input directory").required(true).index(1))
                .arg(Arg::new("output").help("Output directory").required(true).index(2))
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .required(true)
                        .value_parser(value_parser!(usize))
                        .help("Number of files to copy"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Seed for a reproducible selection"),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    init_tracing(&config.log.filter);

    let outcome = match matches.subcommand() {
        Some(("parse", sub)) => handle_parse_command(sub, &config),
        Some(("reconstruct", sub)) => handle_reconstruct_command(sub, &config),
        Some(("batch", sub)) => handle_batch_command(sub, &config),
        Some(("check", sub)) => handle_check_command(sub, &config),
        Some(("survey", sub)) => handle_survey_command(sub, &config),
        Some(("filter", sub)) => handle_filter_command(sub, &config),
        Some(("prefilter", sub)) => handle_prefilter_command(sub, &config),
        Some(("sample", sub)) => handle_sample_command(sub),
        _ => unreachable!(),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Embedded defaults, then `./verdict.toml`, then `--config`, then flags.
fn load_config(matches: &ArgMatches) -> Result<VerdictConfig, Box<dyn Error>> {
    let mut loader = Loader::discover(".");
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    let catalog = matches
        .get_one::<PathBuf>("catalog")
        .map(|path| path.to_string_lossy().into_owned());
    loader = loader.override_with("catalog.path", catalog)?;

    if let Some(("batch", sub)) = matches.subcommand() {
        loader = loader
            .override_with(
                "batch.workers",
                sub.get_one::<u32>("workers").map(|w| i64::from(*w)),
            )?
            .override_with(
                "batch.delete_source",
                sub.get_flag("delete-source").then_some(true),
            )?
            .override_with(
                "batch.require_complete_sections",
                sub.get_flag("allow-incomplete").then_some(false),
            )?;
    }
    Ok(loader.build()?)
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn record_options(config: &VerdictConfig) -> RecordOptions {
    RecordOptions {
        text_field: config.record.text_field.clone(),
        output_field: config.record.output_field.clone(),
    }
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a Path {
    Path::new(
        matches
            .get_one::<String>(name)
            .map(String::as_str)
            .unwrap_or_default(),
    )
}

fn load_checker(config: &VerdictConfig) -> Result<FlagChecker, Box<dyn Error>> {
    let catalog = FlagCatalog::load(&config.catalog.path)?;
    Ok(catalog.compile(config.catalog.filler_spans_lines)?)
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let path = path_arg(matches, "path");
    let output = if matches.get_flag("raw") {
        let text = std::fs::read_to_string(path)?;
        serde_json::to_value(verdict::parse(&text))?
    } else {
        let mut value = read_json(path)?;
        transform_record(&mut value, &record_options(config))?;
        value
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Handle the reconstruct command
fn handle_reconstruct_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let value = read_json(path_arg(matches, "path"))?;
    let field = &config.record.output_field;
    let texts: Vec<String> = match &value {
        Value::Array(items) => items.iter().map(|item| reconstruct_value(item, field)).collect(),
        single => vec![reconstruct_value(single, field)],
    };
    for text in texts {
        println!("{}", text);
    }
    Ok(())
}

/// Handle the batch command
fn handle_batch_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let options = BatchOptions::new(path_arg(matches, "input"), path_arg(matches, "output"))
        .with_workers(config.batch.workers)
        .with_delete_source(config.batch.delete_source)
        .with_require_complete_sections(config.batch.require_complete_sections)
        .with_output_suffix(config.record.output_suffix.clone())
        .with_record(record_options(config));

    let stats = BatchRunner::new(options).run()?;
    println!("Total files: {}", stats.total);
    println!("Succeeded:   {}", stats.succeeded);
    println!("Failed:      {}", stats.failed);
    Ok(())
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let path = path_arg(matches, "path");
    let checker = load_checker(config)?;
    let record = read_json(path)?;
    let report = checker.check(text_of(&record, &config.record.text_field));

    println!("File: {}", path.display());
    if report.has_all_flags() {
        println!("All necessary flags present");
    } else {
        println!("Missing categories: {}", report.missing.join(", "));
    }
    for (category, flags) in &report.found {
        println!("  {}: {}", category, flags.join(", "));
    }
    Ok(())
}

/// Handle the survey command
fn handle_survey_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let checker = load_checker(config)?;
    let report = survey_dir(path_arg(matches, "dir"), &checker, &config.record.text_field)?;

    println!("Scanned {} files, {} with every category", report.scanned, report.matched.len());
    println!("\nBy number of flags:");
    for (count, files) in &report.by_count {
        println!("  {} flags: {} files", count, files);
    }
    println!("\nBy combination:");
    for (combination, files) in &report.combinations {
        println!("  [{}]: {} files", combination.join(", "), files);
    }
    Ok(())
}

/// Handle the filter command
fn handle_filter_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let checker = load_checker(config)?;
    let stats = filter_dir(
        path_arg(matches, "input"),
        path_arg(matches, "output"),
        &checker,
        &config.record.text_field,
    )?;
    println!("Total files: {}", stats.total);
    println!("Moved:       {}", stats.moved);
    println!("Remaining:   {}", stats.remaining());
    Ok(())
}

/// Handle the prefilter command
fn handle_prefilter_command(matches: &ArgMatches, config: &VerdictConfig) -> CliResult {
    let stats = prefilter_dir(
        path_arg(matches, "input"),
        path_arg(matches, "output"),
        &PrefilterRules::from(&config.prefilter),
        &config.record.text_field,
    )?;
    println!("Scanned: {}", stats.scanned);
    println!("Kept:    {}", stats.kept);
    println!("Failed:  {}", stats.failed);
    Ok(())
}

/// Handle the sample command
fn handle_sample_command(matches: &ArgMatches) -> CliResult {
    let count = matches.get_one::<usize>("count").copied().unwrap_or_default();
    let seed = matches.get_one::<u64>("seed").copied();
    let report = sample_files(
        path_arg(matches, "input"),
        path_arg(matches, "output"),
        count,
        seed,
    )?;

    println!("Available: {}", report.available);
    println!("Requested: {}", report.requested);
    println!("Selected:  {}", report.selected);
    println!("Copied:    {}", report.copied.len());
    for file in &report.copied {
        println!("  {}", file.destination.display());
    }
    for (source, error) in &report.failed {
        println!("  failed {}: {}", source.display(), error);
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} file(s) could not be copied", report.failed.len()).into())
    }
}
