use clap::Parser;
use gridpress::{EngineConfig, PublishError, Publisher};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Lays out XML data on a page grid following a layout-rule document.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Layout rules
    #[arg(long)]
    layout: PathBuf,

    /// Data document
    #[arg(long)]
    data: PathBuf,

    /// Base name of the aux file
    #[arg(long)]
    jobname: Option<String>,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the page description goes (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Additional directory to look up images in
    #[arg(long = "search-path")]
    search_paths: Vec<PathBuf>,

    /// Do not write the aux file
    #[arg(long, default_value_t = false)]
    no_aux: bool,

    /// Print `??` for unresolved page references instead of failing
    #[arg(long, default_value_t = false)]
    lenient: bool,

    /// Run even if the rules require another engine version
    #[arg(long, default_value_t = false)]
    ignore_version: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn run(args: Args) -> Result<(), PublishError> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let mut builder = Publisher::builder().with_config(config);
    if let Some(jobname) = args.jobname {
        builder = builder.with_jobname(jobname);
    }
    for dir in args.search_paths {
        builder = builder.with_search_path(dir);
    }
    if args.no_aux {
        builder = builder.with_write_aux(false);
    }
    if args.lenient {
        builder = builder.with_strict_references(false);
    }
    if args.ignore_version {
        builder = builder.with_ignore_version(true);
    }
    let publisher = builder.build()?;

    let output = publisher.run_files(&args.layout, &args.data)?;
    let json = output.to_json()?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!("Wrote {} page(s) to {}", output.last_page, path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Run failures were logged where they happened.
            if !e.is_reported() {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
