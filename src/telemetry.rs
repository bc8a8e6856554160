//! Opt-in tracing setup for study hosts.
//!
//! The library only emits `tracing` events. Hosts that already own a
//! subscriber ignore this module; lightweight harnesses call
//! [`init_default_tracing`] once at startup.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "forecast_conditions=info";

/// Installs a compact global subscriber honoring `RUST_LOG`.
///
/// Returns `false` when the `telemetry` feature is off or a global subscriber
/// is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_FILTER)
}

/// Like [`init_default_tracing`], falling back to `fallback_filter` when
/// `RUST_LOG` is unset or unparsable.
#[must_use]
pub fn init_tracing_with_filter(fallback_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(fallback_filter));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_filter;
        false
    }
}
