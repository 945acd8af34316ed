use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `-v` nor `RUST_LOG` says otherwise.
const DEFAULT_DIRECTIVE: &str = "kubic_init=info";

/// Build the stderr filter: `-v` forces debug, otherwise `RUST_LOG` or the default.
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("kubic_init=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Logs go to stderr so stdout stays for status lines.
pub fn init(verbose: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter(verbose))
        .try_init();
}
