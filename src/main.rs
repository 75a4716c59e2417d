use anyhow::{Context, Result};
use clap::{Arg, Command};
use env_logger::Env;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use samtriplet::batch::{tally_file, CounterMode, ErrorMode};
use samtriplet::report::format_triplet_mutations;

fn main() -> Result<()> {
    let matches = Command::new("samtriplet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reconstructs reference bases from CIGAR and MD:Z and reports triplet mutation spectra")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("SAM")
                .help("Path to the SAM, BAM or CRAM file; .sam files are read as plain text")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Triplet counter: naive, smart")
                .takes_value(true)
                .possible_values(["naive", "smart"])
                .default_value("smart"),
        )
        .arg(
            Arg::new("error-mode")
                .short('e')
                .long("error-mode")
                .value_name("MODE")
                .help("Error handling mode: omit, report")
                .takes_value(true)
                .possible_values(["omit", "report"])
                .default_value("omit"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT")
                .help("Where to write the report (default: stdout)")
                .takes_value(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log per-read details"),
        )
        .get_matches();

    let level = if matches.is_present("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let input = matches.value_of("input").context("Missing --input")?;
    let mode: CounterMode = matches.value_of("mode").unwrap_or("smart").parse()?;
    let error_mode: ErrorMode = matches.value_of("error-mode").unwrap_or("omit").parse()?;

    let summary = tally_file(input, mode, error_mode).context("Failed to count triplet mutations")?;
    let report = format_triplet_mutations(&summary.tally);

    match matches.value_of("output") {
        Some(path) => {
            let file = File::create(path).context(format!("Failed to create {}", path))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(report.as_bytes())?;
            writer.flush()?;
            info!("Wrote {} reference triplets to {}", summary.tally.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            writer.write_all(report.as_bytes())?;
            writer.flush()?;
        }
    }

    if summary.error_count() > 0 {
        eprintln!(
            "Triplet counting completed with {} failed reads out of {}",
            summary.error_count(),
            summary.total_reads
        );
        std::process::exit(1);
    }
    Ok(())
}
