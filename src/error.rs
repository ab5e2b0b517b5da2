use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The upstream request could not be made or its body could not be read
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The upstream answered with a non-success status
    #[error("Failed to fetch: {status}")]
    Status { status: u16 },
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not listen on {addr}: {message}")]
    Bind { addr: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid arguments: {0}")]
    Args(#[from] pico_args::Error),
    #[error("unknown command, expected one of `serve`, `get` or `file`")]
    Usage,
}
