use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generative model unavailable: {0}")]
    Unavailable(String),
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("provider returned no {0} in its response")]
    EmptyResponse(&'static str),
    #[error("provider output did not match the declared shape: {0}")]
    Shape(String),
}
