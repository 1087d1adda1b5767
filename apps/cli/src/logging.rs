//! Logging initialization for the CLI
//!
//! Log lines go to stderr so command output on stdout stays parseable.
//! `RUST_LOG` overrides the level chosen on the command line.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .init();
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mensura={},mensura_units={},mensura_filter={}",
            level, level, level
        ))
    })
}
