//! Error types for trellis operations

#[derive(Debug, thiserror::Error)]
pub enum TrellisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),
}
