use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    /// No element satisfies the geometric and criteria constraints
    #[error("UI object not found at ({x}, {y})")]
    NotFound { x: i32, y: i32 },

    /// Dump text could not be turned into element records
    #[error("Malformed hierarchy snapshot: {0}")]
    MalformedSnapshot(String),

    /// Criteria referenced an attribute no backend knows how to match
    #[error("Search by {0} has not been implemented")]
    UnsupportedCriterion(String),

    /// A `*Matches` criterion whose value is not a valid regular expression
    #[error("Invalid pattern for {criterion}: {source}")]
    InvalidPattern {
        criterion: String,
        #[source]
        source: regex::Error,
    },

    /// Criterion value of the wrong kind for a selector field
    #[error("Invalid value for {criterion}: expected {expected}")]
    InvalidCriterionValue {
        criterion: String,
        expected: &'static str,
    },

    /// A locator no longer matches what is on screen
    #[error("UI inconsistency: {0}")]
    Inconsistent(String),

    /// HTTP request to the on-device server failed
    #[error("Device transport error ({method}): {source}")]
    DeviceTransport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    /// The on-device server answered with a JSON-RPC error object
    #[error("Device RPC {method} failed with code {code}: {message}")]
    DeviceRpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LocatorError {
    /// True for the only outcome callers are expected to recover from.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocatorError::NotFound { .. })
    }
}

pub type LocatorResult<T> = Result<T, LocatorError>;
