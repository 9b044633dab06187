use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Generation request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("XML processing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    AttrError(#[from] quick_xml::events::attributes::AttrError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Output encoding error: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Pipeline error: {message}")]
    PipelineError { message: String },
}

pub type Result<T> = std::result::Result<T, GenError>;
