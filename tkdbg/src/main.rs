use clap::Parser;
use log::LevelFilter;
use std::{
    io,
    path::{Path, PathBuf},
    process,
};
use tilck_config::InspectConfig;
use tkdbg::{logging, session::Session};

lazy_static::lazy_static! {
    /// The layout shipped with the workspace.
    static ref DEFAULT_CONFIG: PathBuf = Path::new(std::env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("config")
        .join("tilck-i386.toml");
}

/// Inspect tasks, processes, handles and wait objects of a Tilck kernel.
#[derive(Parser)]
#[clap(name = "tkdbg")]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Target config (layout, symbols and memory image).
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Log level: off, error, warn, info, debug or trace.
    #[clap(long, default_value = "warn", parse(try_from_str = logging::parse_level))]
    log: LevelFilter,
    /// Command to run, e.g. `get-task 1`. Without one, commands are read
    /// from stdin.
    #[clap(allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("tkdbg: {}", e);
    }
    logging::set_max_level(cli.log);

    let path = cli.config.unwrap_or_else(|| DEFAULT_CONFIG.clone());
    let config = match InspectConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tkdbg: {}", e);
            process::exit(1);
        }
    };
    let session = Session::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if cli.command.is_empty() {
        let stdin = io::stdin();
        session.repl(stdin.lock(), &mut out)
    } else {
        session.run_line(&cli.command.join(" "), &mut out)
    };
    if let Err(e) = result {
        eprintln!("tkdbg: {}", e);
        process::exit(1);
    }
}
