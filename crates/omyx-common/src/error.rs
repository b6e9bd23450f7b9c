use thiserror::Error;

#[derive(Debug, Error)]
pub enum OmyxError {
    /// An analysis run was requested without any omics layer.
    #[error("No layers")]
    NoLayers,

    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Unknown layer type: {0}")]
    UnknownLayerType(String),

    #[error("Reference knowledge error: {0}")]
    Knowledge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OmyxError>;
