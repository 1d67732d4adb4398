use thiserror::Error;

/// Rejected request input. Reported to the caller before any pipeline work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("material cannot be empty")]
    EmptyMaterial,
    #[error("category cannot be empty")]
    EmptyCategory,
    #[error("quantity must be a positive finite number, got {0}")]
    InvalidQuantity(f64),
    #[error("quantity {0} exceeds the limit of 1000000")]
    QuantityTooLarge(f64),
    #[error("unknown unit `{0}`; use kg, pieces, liters, or meters")]
    UnknownUnit(String),
    #[error("unknown condition `{0}`; use clean, contaminated, mixed, or damaged")]
    UnknownCondition(String),
}

/// The generative backend could not produce text for this run.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request timed out after {secs}s")]
    Timeout { provider: &'static str, secs: u64 },
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} call failed with status {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider} response body is not JSON: {reason}")]
    InvalidBody {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} response missing text content")]
    MissingText { provider: &'static str },
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// The backend answered, but its text is not the structure we asked for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no JSON object found in provider text")]
    NoJsonObject,
    #[error("provider text is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("`{field}` field missing or not a list")]
    MissingList { field: &'static str },
    #[error("`{field}` entry {index} has the wrong shape")]
    BadEntry { field: &'static str, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnCode {
    U001ProviderFailed,
    U002ProviderTimeout,
    U003ParseFailed,
    U004RecordSaveFailed,
    U005AuditWriteFailed,
}

impl WarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::U001ProviderFailed => "U001_PROVIDER_FAILED",
            Self::U002ProviderTimeout => "U002_PROVIDER_TIMEOUT",
            Self::U003ParseFailed => "U003_PARSE_FAILED",
            Self::U004RecordSaveFailed => "U004_RECORD_SAVE_FAILED",
            Self::U005AuditWriteFailed => "U005_AUDIT_WRITE_FAILED",
        }
    }

    pub fn for_provider_error(err: &ProviderError) -> Self {
        if err.is_timeout() {
            Self::U002ProviderTimeout
        } else {
            Self::U001ProviderFailed
        }
    }
}
