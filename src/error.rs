use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Field;

/// Process-level error: a message plus the exit code `pangan` terminates with.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the prediction and visualization components.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashError {
    /// A selection label that the field's encoder does not know.
    #[error("Unknown {field} label '{label}'.")]
    UnknownLabel { field: Field, label: String },

    /// A code outside the field's dense `0..len` range.
    #[error("Unknown {field} code {code}.")]
    UnknownCode { field: Field, code: u32 },

    /// The regression model rejected the feature vector or produced garbage.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// An artifact is absent locally and could not be fetched.
    #[error("Missing artifact '{}': {reason}", path.display())]
    MissingArtifact { path: PathBuf, reason: String },

    /// An artifact exists but its contents cannot be decoded.
    #[error("Invalid artifact '{}': {reason}", path.display())]
    InvalidArtifact { path: PathBuf, reason: String },

    /// A date-like column header (or user-entered date) that does not parse.
    #[error("Invalid date '{input}': {reason}")]
    DateParse { input: String, reason: String },
}

impl DashError {
    /// Exit code used when the error terminates the process.
    pub fn exit_code(&self) -> u8 {
        match self {
            DashError::UnknownLabel { .. }
            | DashError::UnknownCode { .. }
            | DashError::InvalidArtifact { .. }
            | DashError::DateParse { .. } => 2,
            DashError::MissingArtifact { .. } => 3,
            DashError::ModelInvocation(_) => 4,
        }
    }
}

impl From<DashError> for AppError {
    fn from(err: DashError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_errors_map_to_exit_codes() {
        let err = DashError::UnknownLabel {
            field: Field::Province,
            label: "ATLANTIS".to_string(),
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
        assert_eq!(app.to_string(), "Unknown Provinsi label 'ATLANTIS'.");

        let missing = DashError::MissingArtifact {
            path: PathBuf::from("model.json"),
            reason: "no URL configured".to_string(),
        };
        assert_eq!(AppError::from(missing).exit_code(), 3);

        let model = DashError::ModelInvocation("expected 7 features, got 6".to_string());
        assert_eq!(AppError::from(model).exit_code(), 4);
    }
}
