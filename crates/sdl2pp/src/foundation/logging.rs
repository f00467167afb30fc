//! Logging setup on top of the `log` facade

use env_logger::Env;

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with an `info` default.
///
/// `RUST_LOG` overrides the default. Calling this more than once is harmless.
pub fn init() {
    init_with_level("info");
}

/// Initialize the logging system with the given default filter.
///
/// `RUST_LOG` still takes precedence when set.
pub fn init_with_level(level: &str) {
    let env = Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("Logger already initialized");
    }
}
