//! Finance Ledger CLI
//!
//! Reads ledger commands from stdin, one per line, and writes results to
//! stdout. Type `help` for the command list.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --file ledger.csv --load
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use clap::Parser;
use finance_ledger::{Ledger, Result, Shell, ShellOptions};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "finance-ledger", version, about = "Personal finance ledger shell")]
struct Cli {
    /// Data file used by `save` and `load` when no path is given
    #[arg(short, long, default_value = "data.csv")]
    file: PathBuf,

    /// Load the data file before reading commands
    #[arg(long)]
    load: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let stdin = io::stdin();
    let options = ShellOptions {
        data_file: cli.file,
        prompt: stdin.is_terminal(),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let mut shell = Shell::new(Ledger::new(), options.clone());
    if cli.load {
        shell.load_file(&options.data_file, &mut handle)?;
    }

    shell.run(stdin.lock(), handle)
}
