use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("size class cannot be empty")]
    EmptySizeClass,

    #[error("invalid size class '{0}': must not contain path separators")]
    InvalidSizeClass(String),
}
