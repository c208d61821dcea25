/// Every way a single commit-message request can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credential env var is missing or blank.
    #[error("{0} is not set")]
    MissingCredential(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Connection refused, DNS, timeout, TLS...
    #[error("request to chat-completion endpoint failed: {0}")]
    Transport(String),

    #[error("chat-completion API error: HTTP {status} - {body}")]
    Remote { status: u16, body: String },

    #[error("malformed chat-completion response: {0}")]
    MalformedResponse(String),

    #[error("chat-completion API returned an empty commit message")]
    EmptyResult,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("timed out: {err}"))
        } else {
            Error::Transport(err.to_string())
        }
    }
}
