//! Error taxonomy shared by the browsing and form engines

use thiserror::Error;

use super::abi::InvalidValue;

/// Failures surfaced by the table browser, form engine and session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    /// The account has no published ABI (not a contract, or wrong network)
    #[error("no ABI published for {account}; it may not be a contract on this network")]
    InterfaceUnavailable { account: String },

    /// Transport or HTTP failure talking to the chain API
    #[error("{}", remote_message(*status, message))]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// A single form field failed validation
    #[error("{field}: {reason}")]
    Validation { field: String, reason: InvalidValue },

    /// Custom endpoint is empty or unusable
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Contract name does not follow the account name rules
    #[error("invalid account name: {0}")]
    InvalidAccount(String),

    #[error("table {0} is not declared by the contract")]
    UnknownTable(String),

    #[error("scope {0} was not discovered; enter it as a custom scope")]
    UnknownScope(String),

    #[error("action {0} is not declared by the contract")]
    UnknownAction(String),

    #[error("no action selected")]
    NoActionSelected,

    /// Rows carry none of the lookup key fields
    #[error("this table has no searchable key field")]
    NotSearchable,
}

impl ExplorerError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

fn remote_message(status: Option<u16>, message: &str) -> String {
    match status {
        // nodeos answers 400 for unknown accounts and tables
        Some(400) => "account or table not found (HTTP 400); verify the selected network".to_string(),
        Some(code) if message.is_empty() => format!("request failed (HTTP {code})"),
        Some(code) => format!("request failed (HTTP {code}): {message}"),
        None => format!("request failed: {message}"),
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_gets_network_hint() {
        let err = ExplorerError::remote(Some(400), "Bad Request");
        assert!(err.to_string().contains("verify the selected network"));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_other_statuses_keep_message() {
        let err = ExplorerError::remote(Some(502), "bad gateway");
        assert_eq!(err.to_string(), "request failed (HTTP 502): bad gateway");

        let err = ExplorerError::remote(None, "operation timed out");
        assert_eq!(err.to_string(), "request failed: operation timed out");
        assert_eq!(err.status(), None);
    }
}
