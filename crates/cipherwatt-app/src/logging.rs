//! Logging bootstrap for native hosts and tests.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `filter`.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case nothing changes. An unparsable filter falls back to `info`.
pub fn init_logging(filter: &str) -> bool {
    let (env_filter, rejected) = match EnvFilter::try_new(filter) {
        Ok(parsed) => (parsed, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();

    if let Some(e) = rejected {
        tracing::warn!(filter, error = %e, "Invalid log filter; using info");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        init_logging("cipherwatt_app=debug");
        assert!(!init_logging("not a [valid filter"));
    }
}
