use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while configuring or running the marketplace layer.
///
/// Signature failures are deliberately absent: an unverifiable signature is
/// an ordinary outcome ([`InvalidSignature`](crate::InvalidSignature)), not
/// an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input was not valid padding-free base64url.
    #[error("malformed base64url input: {0}")]
    Decode(#[from] base64::DecodeError),

    /// A required configuration value is absent.
    #[error("missing configuration: {what}")]
    MissingConfiguration {
        /// The setting that was expected
        what: &'static str,
    },

    /// A typed marketplace parameter could not be coerced.
    #[error("parameter '{name}' is not an integer: '{value}'")]
    InvalidParameter {
        /// Normalized attribute name
        name: String,
        /// Raw value as received
        value: String,
    },

    /// A configuration file or template asset could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Location of the file on disk
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A rewrite pattern failed to compile.
    #[error("invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Why a request reached a guarded handler without a marketplace context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The kind of rejection
    pub kind: RejectionKind,
    /// Developer-facing explanation, logged server-side
    pub message: String,
}

impl Rejection {
    /// Creates a new rejection.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Rejection {}

/// The kind of unauthenticated access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The request carried no `hubspot.marketplace.signature` parameter
    MissingSignature,
    /// A signature was sent but did not verify
    InvalidSignature,
    /// The signature verified but the signed parameters were malformed
    MalformedContext,
    /// The request never passed through the authentication gate
    GateNotConfigured,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::MissingSignature => write!(f, "Missing signature"),
            RejectionKind::InvalidSignature => write!(f, "Invalid signature"),
            RejectionKind::MalformedContext => write!(f, "Malformed context"),
            RejectionKind::GateNotConfigured => write!(f, "Gate not configured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display_includes_kind_and_message() {
        let rejection = Rejection::new(RejectionKind::MissingSignature, "nothing sent");
        assert_eq!(rejection.to_string(), "Missing signature: nothing sent");
    }

    #[test]
    fn missing_configuration_names_the_setting() {
        let err = Error::MissingConfiguration {
            what: "auth.secret_key",
        };
        assert_eq!(err.to_string(), "missing configuration: auth.secret_key");
    }

    #[test]
    fn invalid_parameter_reports_name_and_value() {
        let err = Error::InvalidParameter {
            name: "portal_id".to_string(),
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("portal_id"));
        assert!(err.to_string().contains("abc"));
    }
}
