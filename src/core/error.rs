use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WalkError>;
