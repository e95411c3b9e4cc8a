//! Global tracing subscriber setup.

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig, ObservabilityConfig};

/// Directives appended to the level when the config names no filter.
const QUIET_DEPENDENCIES: &str = "hyper=warn,h2=warn,sqlx=warn,tower_http=info";

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured level and filter entirely.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), TracingError> {
    let logging = &config.logging;
    tracing_subscriber::registry()
        .with(build_env_filter(logging)?)
        .with(fmt_layer(logging))
        .try_init()
        .map_err(|e| TracingError::Init(e.to_string()))
}

fn fmt_layer<S>(logging: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let base = tracing_subscriber::fmt::layer()
        .with_file(logging.file_line)
        .with_line_number(logging.file_line);

    match (logging.format, logging.timestamps) {
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Json, true) => base
            .json()
            .with_current_span(logging.include_spans)
            .boxed(),
        (LogFormat::Json, false) => base
            .json()
            .with_current_span(logging.include_spans)
            .without_time()
            .boxed(),
    }
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, TracingError> {
    let level = config.level.as_directive();
    let directives = match std::env::var("RUST_LOG") {
        Ok(from_env) => from_env,
        Err(_) => match &config.filter {
            Some(extra) => format!("{level},{extra}"),
            None => format!("{level},{QUIET_DEPENDENCIES}"),
        },
    };

    EnvFilter::try_new(&directives).map_err(|e| TracingError::Filter {
        directives,
        reason: e.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("invalid log filter '{directives}': {reason}")]
    Filter { directives: String, reason: String },

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}
