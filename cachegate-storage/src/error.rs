use std::error::Error;

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Expired,
    IoError(std::io::Error),
    BackendError(String),
    SerializationError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Namespace or field not found"),
            StoreError::Expired => write!(f, "Namespace expired"),
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
            StoreError::BackendError(e) => write!(f, "Backend error: {}", e),
            StoreError::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}
