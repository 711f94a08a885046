use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Unsupported content {content_id}: {reason}")]
    UnsupportedContent { content_id: String, reason: String },

    #[error("Invalid play request: {0}")]
    InvalidRequest(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

impl PlayerError {
    pub fn unsupported(content_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedContent {
            content_id: content_id.into(),
            reason: reason.into(),
        }
    }

    /// Fatal request errors. These are never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedContent { .. } | Self::InvalidRequest(_)
        )
    }

    /// Engine load/network failures. A later `play()` may recover.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}
