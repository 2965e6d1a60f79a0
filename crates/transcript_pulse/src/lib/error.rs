/// Terminal failure classes of one metadata fetch, surfaced after the
/// per-category retry budget is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (transport error or non-2xx
    /// status).
    #[error("encountered an error when making the http request: {0}")]
    TransientHttp(String),

    /// The request succeeded but the page carried no parseable
    /// metadata payload.
    #[error("metadata request returned no parseable payload, please try again later")]
    EmptyResponse,

    /// The payload parsed but the video detail key path is absent.
    /// Callers must treat this as permanently private or removed.
    #[error("video details could not be parsed; video is private or has been removed")]
    UnavailableVideo,
}
