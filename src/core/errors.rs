use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API error: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Channel {channel} does not support {operation}")]
    ChannelMisuse {
        channel: String,
        operation: &'static str,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ExchangeError {
    /// Errors that originate from a single inbound frame and must never tear
    /// down the connection.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            Self::ProtocolDecode(_) | Self::Decompression(_) | Self::JsonError(_)
        )
    }
}
