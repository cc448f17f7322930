use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use track_network::network::{Network, ValidationConfig};
use track_network::store;

const USAGE: &str = "usage: track-network <validate|dump> <network.json> [--connectivity-only]";

enum Command {
    Validate { path: PathBuf, config: ValidationConfig },
    Dump { path: PathBuf },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Command> {
    let command = args.next()?;
    let path = PathBuf::from(args.next()?);
    let flags: Vec<String> = args.collect();

    match command.as_str() {
        "validate" => {
            let config = if flags.iter().any(|f| f == "--connectivity-only") {
                ValidationConfig::connectivity_only()
            } else {
                ValidationConfig::default()
            };
            Some(Command::Validate { path, config })
        }
        "dump" => Some(Command::Dump { path }),
        _ => None,
    }
}

fn load(path: &Path) -> Option<Network> {
    match store::load_from_path(path) {
        Ok(network) => Some(network),
        Err(e) => {
            eprintln!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match command {
        Command::Validate { path, config } => {
            let Some(network) = load(&path) else {
                return ExitCode::from(2);
            };
            let report = network.validate(&config);
            print!("{report}");
            if report.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Dump { path } => {
            let Some(network) = load(&path) else {
                return ExitCode::from(2);
            };
            println!("Network ({} blocks):", network.len());
            print!("{network}");
            ExitCode::SUCCESS
        }
    }
}
