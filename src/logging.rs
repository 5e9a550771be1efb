//! stderr logging for the binaries.
//!
//! The library only emits `log` records. Binaries call [`init`] once; `RUST_LOG`
//! overrides the level picked from `-v` flags. stdout stays reserved for JSON.

use env_logger::{Builder, Env};

/// Default filter for a given number of `-v` flags.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init(verbosity: u8) {
    let env = Env::default().default_filter_or(default_filter(verbosity));
    // A second init (tests, embedding) keeps the first logger.
    let _ = Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
