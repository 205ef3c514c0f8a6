use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use recstack::cli::Args;
use recstack::config::Config;
use recstack::{Result, RecordStack, debug as layout, input, ops, output};

/// Set up SIGPIPE handling for Unix systems
/// This prevents "broken pipe" errors when output is piped to commands like `head`
#[cfg(unix)]
fn setup_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn setup_sigpipe() {
    // Windows doesn't have SIGPIPE
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    setup_sigpipe();
    setup_logging();

    if let Err(e) = run() {
        eprintln!("recstack: {}", e);
        std::process::exit(e.status());
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args)?;
    let mut stack = RecordStack::new(config.stack)?;

    // Push records from files or stdin, in order
    if config.input_files.is_empty() {
        let stdin = io::stdin();
        let reader = BufReader::new(stdin.lock());
        input::push_all_records(reader, config.record_delimiter, &mut stack)?;
    } else {
        for path in &config.input_files {
            let reader: Box<dyn BufRead> = if path == "-" {
                Box::new(BufReader::new(io::stdin().lock()))
            } else {
                Box::new(BufReader::new(File::open(path)?))
            };
            let pushed = input::push_all_records(reader, config.record_delimiter, &mut stack)?;
            debug!(path = %path, records = pushed, "loaded input");
        }
    }

    ops::apply_all(&config.ops, &mut stack)?;

    if config.debug {
        let stderr = io::stderr();
        let mut stderr = stderr.lock();
        layout::debug_stack(&mut stderr, &stack)?;
        stderr.flush()?;
    }

    let mut out = output::open_output(&config)?;
    output::write_records(&mut out, &stack, &config)?;

    Ok(())
}
