//! Diagnostic logging setup.
//!
//! Everything goes to stderr so it never interleaves with the rendered
//! dashboard on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "BOTDASH_LOG";

/// Pick the filter directive: `BOTDASH_LOG` if set and non-empty, else the
/// configured level.
fn directive(env_value: Option<String>, configured: &str) -> String {
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| configured.to_string())
}

/// Install the global subscriber. Safe to call more than once; only the
/// first call has an effect.
pub fn init(configured_level: &str) {
    let directive = directive(std::env::var(LOG_ENV).ok(), configured_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("botdash: invalid log filter '{directive}' ({e}), using 'warn'");
        EnvFilter::new("warn")
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins_over_config() {
        assert_eq!(directive(Some("debug".to_string()), "warn"), "debug");
    }

    #[test]
    fn blank_env_falls_back_to_config() {
        assert_eq!(directive(Some("  ".to_string()), "info"), "info");
        assert_eq!(directive(None, "botdash=trace"), "botdash=trace");
    }

    #[test]
    fn init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
