use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter { parameter: &'static str, reason: String },
}

impl FilterError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// The offending query parameter, when the error is about one.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            FilterError::InvalidTableName(_) => None,
            FilterError::MissingParameter(parameter) => Some(parameter),
            FilterError::InvalidParameter { parameter, .. } => Some(parameter),
        }
    }
}
