use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigiError {
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameterError(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Upload error: {0}")]
    UploadError(String),

    #[error("Capacity error: {0}")]
    CapacityError(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, VigiError>;
