use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("JSON deserialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Validation failed at record {index}, field '{field}': {reason}")]
    Validation {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Source '{source_id}' produced an empty batch; refusing drop+replace on partial data")]
    EmptyBatch { source_id: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
