//! Log subscriber setup.
//!
//! Library code only emits `tracing` events. Binaries and tests that want to
//! see them call [`init`] once at startup.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "ricochet_ecs=warn,ricochet_engine=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
///
/// Returns `false` if a global subscriber was already installed, so calling
/// this from several tests is harmless.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// [`init`] with [`DEFAULT_FILTER`].
pub fn init_default() -> bool {
    init(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused_without_panicking() {
        init("warn");
        assert!(!init("debug"));
    }
}
