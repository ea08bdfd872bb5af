use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the stderr subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let default = if verbose {
            "occ_core=debug,occ_cli=debug"
        } else {
            "occ_core=info,occ_cli=info"
        };
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            )
            .init();
    });
}
