//! Tracing setup for Zixin binaries.
//!
//! [`init_tracing`] installs one global `fmt` subscriber writing to stderr,
//! so stdout stays reserved for the encoded result. `RUST_LOG` wins over the
//! level passed in. Only the first call installs anything.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or `level` when it is unset or unparsable.
pub fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Initialise the global tracing subscriber.
///
/// With `json`, each event is one JSON object whose fields (`event`,
/// `invocation_id`, `stage`, ...) sit at the top level next to the span
/// context.
pub fn init_tracing(json: bool, level: Level) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(default_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .try_init()
    } else {
        builder.try_init()
    };
    // a subscriber set earlier in the process keeps precedence
    installed.ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
    }

    #[test]
    fn test_default_filter_uses_level_when_env_unset() {
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(
                default_filter(Level::DEBUG).max_level_hint(),
                Some(tracing::level_filters::LevelFilter::DEBUG)
            );
        }
    }
}
