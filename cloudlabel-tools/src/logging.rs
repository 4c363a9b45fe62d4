use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber.
///
/// The level comes from `RUST_LOG`, defaulting to `info`; `verbose` adds debug
/// output for the cloudlabel crates on top of that.
pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if verbose {
        filter = filter.add_directive("cloudlabel=debug".parse()?);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;
    Ok(())
}
