/// Typed errors for the enhancement pipeline and its codec collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Empty signal: {0}")]
    EmptySignal(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Resample failed: {0}")]
    Resample(String),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
