use thiserror::Error;

#[derive(Error, Debug)]
pub enum TravlogError {
    /// The URL argument does not name anything this tool knows how to show.
    /// Surfaced as a command-line usage error, not a runtime failure.
    #[error("unsupported URL")]
    UnsupportedUrl,

    #[error("API request failed: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no substitution for {{{0}}}")]
    MissingKey(String),

    #[error("branch references unknown commit {0}")]
    CommitLookup(u64),

    #[error("git: {0}")]
    Git(String),
}

pub type Result<T> = std::result::Result<T, TravlogError>;
