use thiserror::Error;

pub type Result<T> = std::result::Result<T, LampError>;

#[derive(Debug, Error)]
pub enum LampError {
    /// The HTTP exchange did not complete (connection refused, DNS, reset, ...).
    #[error("Failed to reach lamp service at {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Success status, but the body was not JSON or had no `lamp_action`.
    #[error("Lamp service returned an unreadable reply: {source} (body: {body})")]
    MalformedResponse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid lamp service URL '{url}': {reason}")]
    Config { url: String, reason: String },
}

impl LampError {
    pub fn is_transport(&self) -> bool {
        matches!(self, LampError::Transport { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, LampError::MalformedResponse { .. })
    }
}
