//! Opt-in tracing setup for hosts embedding `chart-axes`.
//!
//! Axis computations emit `debug!` events on recompute, `trace!` on cache
//! hits and `warn!` for recoverable fallbacks. Hosts either call one of the
//! initializers below or install their own subscriber.

/// Filter used when `RUST_LOG` is unset: fallback warnings from this crate only.
pub const DEFAULT_AXIS_FILTER: &str = "chart_axes=warn";

/// Installs a compact subscriber filtered by `RUST_LOG`, or by
/// [`DEFAULT_AXIS_FILTER`] when the variable is unset or invalid.
///
/// Returns `false` when the `telemetry` feature is disabled or the host already
/// set a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_AXIS_FILTER));
        return install(filter);
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

/// Installs a compact subscriber with explicit filter directives, such as
/// `"chart_axes=debug"` to follow every coordinate set recompute.
///
/// Malformed directives return `false` without installing anything.
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        return match tracing_subscriber::EnvFilter::try_new(directives) {
            Ok(filter) => install(filter),
            Err(_) => false,
        };
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}

#[cfg(feature = "telemetry")]
fn install(filter: tracing_subscriber::EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .is_ok()
}
