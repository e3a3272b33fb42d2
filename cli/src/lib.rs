//! Shared setup for the `bitbucket-collect` and `github-mirror` binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
pub fn init_tracing() {
    tracing_subscriber::registry()
        // Use compact formatting without module target paths for cleaner output
        .with(fmt::layer().compact().with_target(false))
        // Falls back to "info" level if RUST_LOG is not set or invalid
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Installs aws-lc-rs as the process-wide rustls crypto provider.
///
/// Both HTTP clients pull in rustls; without a process default rustls can't
/// pick between the providers compiled in.
pub fn install_crypto_provider() {
    // Already installed is fine.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}
