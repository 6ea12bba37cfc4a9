//! Logging setup for the command-line tool.
//!
//! Library code only emits `tracing` events; the binary installs a subscriber
//! once at startup:
//!
//! ```
//! tileset_minimiser::logging::init_subscriber(tracing::Level::INFO);
//! ```

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs a global subscriber writing to stderr. Later calls are ignored.
pub fn init_subscriber(max_level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Maps `-q` / `-v` counts to a level. Info by default.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::WARN;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
