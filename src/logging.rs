use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Setup console logging on stderr.
///
/// `RUST_LOG` takes precedence when set. Otherwise only warnings are shown,
/// or debug output for this crate when `verbose` is true.
pub fn setup_logging(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pairfile=debug")
        } else {
            EnvFilter::new("pairfile=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!(verbose, "logging initialized");
    Ok(())
}
