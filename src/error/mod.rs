#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Encoder Error: {0}")]
    Encoder(String),

    #[error("Generator Error: {0}")]
    Generator(String),

    #[error("Invalid Sigma: {0} should be positive and finite")]
    InvalidSigma(f64),

    #[error("Listener Error: {name} failed: {reason}")]
    Listener { name: String, reason: String },

    #[error("Shape Mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Validation Error: {0} should be {1}")]
    Validation(String, String),
}
