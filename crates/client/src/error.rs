// crates/client/src/error.rs
use thiserror::Error;

/// Errors from talking to the index server.
///
/// Connectivity failures and backend failures get identical treatment from
/// the caller's perspective: both mean "index unavailable". On the write
/// path they are swallowed; on the read path they signal the caller to
/// fall back to its local search.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, timeout, or a malformed response.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("index server returned {0}")]
    Status(reqwest::StatusCode),
}

pub type Result<T> = std::result::Result<T, ClientError>;
