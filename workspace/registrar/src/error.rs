use thiserror::Error;

/// Error types for the registrar module.
///
/// The variants map one-to-one onto the HTTP taxonomy the handlers speak:
/// validation (400), not-found (404), authorization (403), conflict (409)
/// and internal store failures (500).
#[derive(Error, Debug)]
pub enum RegistrarError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Role, department or assignment mismatch
    #[error("{0}")]
    Authorization(String),

    /// Unique-constraint style conflict
    #[error("{0}")]
    Conflict(String),
}

/// Type alias for Result with RegistrarError
pub type Result<T> = std::result::Result<T, RegistrarError>;
