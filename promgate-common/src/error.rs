use thiserror::Error;

/// Common error type for promgate components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a JSON push body into a [`PushRequest`].
///
/// [`PushRequest`]: crate::push::PushRequest
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The body is not valid JSON, or does not match the expected shape.
    #[error("body: {body}: {source}")]
    MalformedJson {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded fine but carried neither metrics nor labels.
    #[error("empty labels not allowed")]
    EmptyPayload,
}

impl TranslateError {
    pub(crate) fn malformed(body: &[u8], source: serde_json::Error) -> Self {
        TranslateError::MalformedJson {
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        }
    }
}

/// Result type alias using promgate's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("Failed to initialize tracing: already set".to_string());
        match &err {
            Error::Config(msg) => assert!(msg.contains("tracing")),
        }
        assert_eq!(
            err.to_string(),
            "Configuration error: Failed to initialize tracing: already set"
        );
    }

    #[test]
    fn test_translate_error_messages() {
        assert_eq!(TranslateError::EmptyPayload.to_string(), "empty labels not allowed");

        let source = serde_json::from_slice::<serde_json::Value>(b"{x").unwrap_err();
        let err = TranslateError::malformed(b"{x", source);
        assert!(err.to_string().starts_with("body: {x: "));
    }
}
