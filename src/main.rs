//! Command-line interface for deobkit
//!
//! Usage:
//!   deobkit offsets `<target-file>` [--base-mode `<mode>`] [--count-mode `<mode>`]
//!   deobkit rename `<file>` `<new-name>`
//!   deobkit inject `<target-file>` [--decoder `<name>`]
//!   deobkit correct `<file>` --out `<path>`
//!
//! Every subcommand exits 1 with a diagnostic on missing files or absent
//! patterns; success exits 0 after printing what was done.

use clap::{Arg, ArgMatches, Command};
use deobkit::inject::DEFAULT_DECODER;
use deobkit::offsets::{BaseHexMode, CountMode};
use deobkit::workflow;
use deobkit::{ApiCorrector, DeobConfig, DeobError};
use std::env;
use std::path::Path;

const RUST_LOG: &str = "RUST_LOG";

fn main() {
    if env::var_os(RUST_LOG).is_none() {
        env::set_var(RUST_LOG, "warn,deobkit=info");
    }
    tracing_subscriber::fmt::init();

    let cli = Command::new("deobkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Helpers for a manual JavaScript deobfuscation workflow")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("offsets")
                .about("Compute boundary offsets and append them to the target file")
                .arg(
                    Arg::new("target")
                        .help("File to scan and append to")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("base-mode")
                        .long("base-mode")
                        .help("How to locate the base hex: minus-hex | fn-body-hex"),
                )
                .arg(
                    Arg::new("count-mode")
                        .long("count-mode")
                        .help("How to count: lines-between | largest-string-array"),
                ),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename the first exported identifier throughout a file")
                .arg(
                    Arg::new("file")
                        .help("File to rewrite in place")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("new-name")
                        .help("Replacement identifier")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("inject")
                .about("Append the hex-range replacer scaffold to the target file")
                .arg(
                    Arg::new("target")
                        .help("File to append to")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("decoder")
                        .long("decoder")
                        .help("Decoder function name substituted into the scaffold")
                        .default_value(DEFAULT_DECODER),
                ),
        )
        .subcommand(
            Command::new("correct")
                .about("Fix small formatting issues through a hosted model")
                .arg(
                    Arg::new("file")
                        .help("File to correct")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .help("Where to write the corrected file")
                        .required(true),
                ),
        );

    // Wrong or missing arguments exit 1; help and version still exit 0
    let matches = cli.try_get_matches().unwrap_or_else(|e| {
        if matches!(
            e.kind(),
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
        ) {
            e.exit();
        }
        let _ = e.print();
        std::process::exit(1);
    });

    let config = DeobConfig::from_dir(Path::new("."));

    match matches.subcommand() {
        Some(("offsets", sub)) => handle_offsets(sub, config),
        Some(("rename", sub)) => handle_rename(sub),
        Some(("inject", sub)) => handle_inject(sub),
        Some(("correct", sub)) => handle_correct(sub, config),
        _ => unreachable!("subcommand is required"),
    }
}

fn handle_offsets(matches: &ArgMatches, mut config: DeobConfig) {
    if let Some(mode) = matches.get_one::<String>("base-mode") {
        config.base_mode = mode.parse::<BaseHexMode>().unwrap_or_else(|e| fail(e));
    }
    if let Some(mode) = matches.get_one::<String>("count-mode") {
        config.count_mode = mode.parse::<CountMode>().unwrap_or_else(|e| fail(e));
    }

    let target = required_path(matches, "target");
    let appended =
        workflow::append_offset_decls(target, &config).unwrap_or_else(|e| fail(e));

    for statement in &appended.statements {
        println!("{}", statement);
    }
}

fn handle_rename(matches: &ArgMatches) {
    let file = required_path(matches, "file");
    let new_name = matches
        .get_one::<String>("new-name")
        .expect("new-name is required");

    let outcome = workflow::rename_export_in_file(file, new_name).unwrap_or_else(|e| fail(e));
    println!(
        "Renamed all instances of '{}' to '{}' ({} occurrences)",
        outcome.original, outcome.replacement, outcome.occurrences
    );
}

fn handle_inject(matches: &ArgMatches) {
    let target = required_path(matches, "target");
    let decoder = matches
        .get_one::<String>("decoder")
        .expect("decoder has a default");

    workflow::append_boilerplate(target, decoder).unwrap_or_else(|e| fail(e));
    println!("Appended replacer scaffold to {}", target.display());
}

fn handle_correct(matches: &ArgMatches, config: DeobConfig) {
    let file = required_path(matches, "file");
    let out = required_path(matches, "out");

    let corrector = ApiCorrector::from_env(&config.corrector).unwrap_or_else(|e| fail(e));
    workflow::correct_file(file, out, &corrector).unwrap_or_else(|e| fail(e));
    println!("Corrected content written to {}", out.display());
}

fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> &'a Path {
    Path::new(
        matches
            .get_one::<String>(name)
            .expect("argument is required")
            .as_str(),
    )
}

fn fail(error: DeobError) -> ! {
    eprintln!("{}", error);
    std::process::exit(1);
}
