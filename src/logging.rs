use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate log level for a count of `-v` flags.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "throughput_board=info",
        1 => "throughput_board=debug",
        _ => "throughput_board=trace",
    }
}

/// Initializes console logging on stderr. `RUST_LOG` takes precedence over the verbosity level.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // stdout carries the report
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
