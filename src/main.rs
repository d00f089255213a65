use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

use compiletime_bench::config;
use compiletime_bench::display;
use compiletime_bench::logging;
use compiletime_bench::pipeline;
use compiletime_bench::report;
use compiletime_bench::runner::BashRunner;
use compiletime_bench::script;
use compiletime_bench::types::ReportKind;

#[derive(Parser)]
#[command(
    name = "compiletime-bench",
    version,
    about = "Time SDK crate builds and turn the timing logs into markdown tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ./compiletime-bench.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Write the script, run it, and format both reports (default)
    Run {
        /// Capture the script's output instead of streaming it
        #[arg(long)]
        capture: bool,
    },
    /// Only write the benchmark script
    Script {
        /// Print the script instead of writing it
        #[arg(long)]
        stdout: bool,
    },
    /// Only format existing accumulator files
    Report {
        /// Accumulator files (default: unoptimized.txt and optimized.txt)
        files: Vec<PathBuf>,

        /// Format only this build profile's accumulator (ignored with FILES)
        #[arg(long, value_enum)]
        kind: Option<ReportKind>,

        /// Print parsed records as JSON, keyed by file path, instead of writing markdown
        #[arg(long)]
        json: bool,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("warning: {}", err);
    }

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run { capture: false }) {
        Command::Run { capture } => {
            let runner = BashRunner::new(capture);
            let summary = pipeline::run_benchmark(&config, &runner)?;
            print!("{}", display::format_outcome(&summary.outcome));
            print!("{}", display::format_reports(&summary.reports));
        }
        Command::Script { stdout } => {
            if stdout {
                print!("{}", script::render_script(&config));
            } else {
                pipeline::prepare_script(&config)?;
                println!("{}", config.script_path.display());
            }
        }
        Command::Report { files, kind, json } => {
            let files = match (files.is_empty(), kind) {
                (false, _) => files,
                (true, Some(kind)) => vec![config.report_path(kind.file_name())],
                (true, None) => pipeline::default_report_paths(&config),
            };

            if json {
                let mut parsed = Vec::new();
                for file in files {
                    let records = report::read_report(&file)?;
                    parsed.push((file, records));
                }
                println!("{}", display::format_json(&parsed));
            } else {
                let reports = pipeline::format_reports(&files)?;
                print!("{}", display::format_reports(&reports));
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
