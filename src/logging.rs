use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter precedence: `RUST_LOG`, then `--verbose`, then the settings file.
pub fn filter_directive(env: Option<&str>, verbose: bool, configured: &str) -> String {
    if let Some(env) = env.filter(|e| !e.trim().is_empty()) {
        return env.to_string();
    }
    if verbose {
        "debug".to_string()
    } else {
        configured.to_string()
    }
}

pub fn init_logging(verbose: bool, configured: &str) {
    let env = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(env.as_deref(), verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    // Tables go to stdout; logs stay out of the way on stderr.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
