use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid application definition: {0}")]
    InvalidDefinition(String),

    #[error("Application source error: {0}")]
    Source(String),

    #[error("Service registrar error: {0}")]
    Registrar(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),
}
