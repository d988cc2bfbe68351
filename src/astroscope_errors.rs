use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstroScopeError {
    #[error("Invalid orbital elements: {0}")]
    InvalidOrbitalElements(String),

    #[error("Invalid sample count: {0} (at least 2 samples are needed to close an orbit)")]
    InvalidSampleCount(usize),

    #[error("Invalid physical parameters: {0}")]
    InvalidPhysicalParameters(String),

    #[error("Invalid impact request: {0}")]
    InvalidImpactRequest(String),

    #[error("HTTP reqwest error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unexpected payload from {source_name}: {message}")]
    UnexpectedPayload {
        source_name: String,
        message: String,
    },

    #[error("Object not found in {source_name}: {designation}")]
    ObjectNotFound {
        source_name: String,
        designation: String,
    },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

impl AstroScopeError {
    pub(crate) fn unexpected_payload(source_name: &str, message: impl Into<String>) -> Self {
        AstroScopeError::UnexpectedPayload {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}

impl PartialEq for AstroScopeError {
    fn eq(&self, other: &Self) -> bool {
        use AstroScopeError::*;
        match (self, other) {
            (InvalidOrbitalElements(a), InvalidOrbitalElements(b)) => a == b,
            (InvalidSampleCount(a), InvalidSampleCount(b)) => a == b,
            (InvalidPhysicalParameters(a), InvalidPhysicalParameters(b)) => a == b,
            (InvalidImpactRequest(a), InvalidImpactRequest(b)) => a == b,

            // not comparable, same variant is enough
            (HttpError(_), HttpError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (
                UnexpectedPayload {
                    source_name: s1,
                    message: m1,
                },
                UnexpectedPayload {
                    source_name: s2,
                    message: m2,
                },
            ) => s1 == s2 && m1 == m2,
            (
                ObjectNotFound {
                    source_name: s1,
                    designation: d1,
                },
                ObjectNotFound {
                    source_name: s2,
                    designation: d2,
                },
            ) => s1 == s2 && d1 == d2,
            (InvalidConfig { key: k1, value: v1 }, InvalidConfig { key: k2, value: v2 }) => {
                k1 == k2 && v1 == v2
            }

            _ => false,
        }
    }
}
