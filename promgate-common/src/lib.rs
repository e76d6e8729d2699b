//! promgate common library
//!
//! This crate holds the translation engine shared by the gateway adapters:
//!
//! - [`push`] - Push request model (`PushRequest`, `Metric`, `Label`)
//! - [`structured`] - Decoding of `{metrics, labels}` push bodies
//! - [`flat`] - Decoding of flat key/value push bodies
//! - [`exposition`] - Prometheus text exposition rendering
//! - [`config`] - Shared logging configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod exposition;
pub mod flat;
pub mod push;
pub mod structured;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig};
pub use error::{Error, Result, TranslateError};
pub use exposition::{format_value, render, render_all};
pub use flat::{FlatValue, SENTINEL_METRIC_NAME, parse_flat};
pub use push::{Label, Metric, PushRequest};
pub use structured::parse_structured;

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Example
///
/// ```ignore
/// use promgate_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
