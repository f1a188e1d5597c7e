/// Main error type for the library.
#[derive(thiserror::Error, Debug)]
pub enum ReaderError {
    /// The depth file is missing or could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The image container could not be decoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The file was opened, but its content does not match the expected format.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Used when the user pass a logical invalid parameter to a function.
    #[error("Parameter error: {0}")]
    InvalidParameter(String),

    /// The camera configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ReaderError {
    /// Create a error with the kind `InvalidParameter`.
    /// # Arguments
    /// * `msg` - The error message.
    pub fn invalid_parameter<T: ToString>(msg: T) -> Self {
        ReaderError::InvalidParameter(msg.to_string())
    }

    /// Create a error with the kind `Decode`.
    pub fn decode<T: ToString>(msg: T) -> Self {
        ReaderError::Decode(msg.to_string())
    }
}
