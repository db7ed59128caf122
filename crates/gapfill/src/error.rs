#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The access credential is absent. Distinct so callers can tell a
    /// configuration problem from a service problem.
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    /// Non-success response; `message` is the upstream error description,
    /// unmodified.
    #[error("gemini api error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The response parsed as JSON but did not contain generated text.
    #[error("malformed gemini response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
