use std::sync::Once;

use config::environment::Environment;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to determine the application environment: {0}")]
    Environment(#[from] config::environment::UnknownEnvironment),
    #[error("failed to install the tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Installs the global subscriber for `app_name`.
///
/// The filter comes from `RUST_LOG` and defaults to `{app_name}=info` plus `info` for
/// the semaphore crate. Production emits one JSON object per line, development emits
/// human readable lines.
pub fn init_tracing(app_name: &str) -> Result<(), TracingError> {
    let environment = Environment::load()?;
    init_tracing_for(app_name, environment)
}

/// Same as [`init_tracing`] with an explicit environment.
pub fn init_tracing_for(app_name: &str, environment: Environment) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(app_name)));

    let registry = tracing_subscriber::registry().with(filter);

    if environment.is_prod() {
        registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .try_init()?;
    } else {
        registry.with(fmt::layer().pretty()).try_init()?;
    }

    Ok(())
}

/// Installs a subscriber writing through the test harness, once per process.
///
/// Set `ENABLE_TRACING=1` to see the output.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_err() {
            return;
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("semaphore=debug,info"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}

fn default_directives(app_name: &str) -> String {
    format!("{app_name}=info,semaphore=info,postgres=info,warn")
}
