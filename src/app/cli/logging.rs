use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; stdout carries tool output and results.
/// `RUST_LOG` directives take precedence over the verbosity flag.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
