use crate::validation::FieldErrors;
use clinic_types::StatusError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("unknown {kind}: {id}")]
    UnknownReference { kind: &'static str, id: String },
    #[error("staff member {0} is not a doctor")]
    NotADoctor(String),
    #[error("appointment not found: {0}")]
    NotFound(String),
    #[error("failed to read seed file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("appointment store is unavailable")]
    StorePoisoned,
}

impl From<FieldErrors> for BookingError {
    fn from(errors: FieldErrors) -> Self {
        BookingError::Validation(errors)
    }
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;
