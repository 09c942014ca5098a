use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over the
/// crate-level default.
pub fn init(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "gamedeck=debug" } else { "gamedeck=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install logger: {}", err))?;

    Ok(())
}
