//! Tracing subscriber setup.
//!
//! Logs go to stderr so that stdout carries nothing but answers.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Default filter for a verbosity level, used when `RUST_LOG` is unset.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "faqbot=warn,faqbot_cli=warn,faqbot_rag=warn",
        1 => "faqbot=info,faqbot_cli=info,faqbot_rag=info",
        _ => "faqbot=debug,faqbot_cli=debug,faqbot_rag=debug",
    }
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
