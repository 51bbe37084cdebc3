use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by PayPal Express operations.
///
/// Remote business failures are not errors: they come back as a
/// [`Response`](crate::Response) whose `is_failure()` is true.
#[derive(Debug, Error)]
pub enum PaypalError {
    #[error("{type_name}: missing required attribute `{attribute}`")]
    MissingAttribute {
        type_name: &'static str,
        attribute: &'static str,
    },

    #[error("{type_name}: invalid attribute `{attribute}`: {reason}")]
    InvalidAttribute {
        type_name: &'static str,
        attribute: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl PaypalError {
    pub(crate) fn missing(type_name: &'static str, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            type_name,
            attribute,
        }
    }

    pub(crate) fn invalid(
        type_name: &'static str,
        attribute: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            type_name,
            attribute,
            reason: reason.into(),
        }
    }

    /// True for construction-time validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingAttribute { .. } | Self::InvalidAttribute { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_message_names_type_and_field() {
        let err = PaypalError::missing("Credentials", "signature");
        assert_eq!(
            err.to_string(),
            "Credentials: missing required attribute `signature`"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_transport_error_is_not_validation() {
        let err = PaypalError::from(TransportError::Timeout);
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "request timed out");
    }
}
