pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Default filter directive; `RUST_LOG` directives are applied on top.
pub const DEFAULT_DIRECTIVE: &str = "muscat_bay=info";

/// Initializes the global tracing subscriber. Logs go to stderr so shell output stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        // A subscriber may already be installed by an embedding application.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
