//! Error types for the protocol layer.
//!
//! [`RemoteCallFailure`] is the single normalized failure every response
//! envelope collapses into, whichever protocol generation served the call.
//! [`GatewayError`] is what gateways and the [`crate::Api`] facade return: it
//! carries a [`RemoteCallFailure`] for application-level failures and adds
//! the transport conditions a gateway implementation may hit.

use thiserror::Error;

/// Largest response body, in bytes, a gateway will decode.
pub const RESPONSE_SIZE_LIMIT: usize = 5 * 1024 * 1024 + 1337;

// ---------------------------------------------------------------------------
// Unified remote failure
// ---------------------------------------------------------------------------

/// A remote call reported failure.
///
/// `reason` is human-readable and may span several lines, one per error the
/// control panel reported. It is never empty: a failure with no reason at all
/// reads `"Unknown"`.
///
/// Informational messages that arrived alongside the failure (UAPI only) are
/// kept in [`RemoteCallFailure::messages`]; they are not part of the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RemoteCallFailure {
    reason: String,
    messages: Option<String>,
}

impl RemoteCallFailure {
    /// Reason used when a failed envelope carries no reason text.
    pub const UNKNOWN: &'static str = "Unknown";

    /// Creates a failure from a reason string; an empty reason becomes `"Unknown"`.
    pub fn new(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.is_empty() {
            Self::unknown()
        } else {
            Self {
                reason,
                messages: None,
            }
        }
    }

    /// Creates a failure from several reasons joined with newlines.
    ///
    /// An empty list yields `"Unknown"`.
    pub fn joined<S: AsRef<str>>(reasons: &[S]) -> Self {
        let joined = reasons
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(joined)
    }

    /// The `"Unknown"` failure.
    pub fn unknown() -> Self {
        Self {
            reason: Self::UNKNOWN.to_owned(),
            messages: None,
        }
    }

    /// Attaches the informational messages reported with the failure.
    #[must_use]
    pub fn with_messages(mut self, messages: Option<String>) -> Self {
        self.messages = messages;
        self
    }

    /// Returns the reason text.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the informational messages reported with the failure, if any.
    pub fn messages(&self) -> Option<&str> {
        self.messages.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Gateway errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::ApiGateway`] implementations and the facade.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The control panel answered and reported failure.
    #[error(transparent)]
    Remote(#[from] RemoteCallFailure),

    /// The transport could not complete the round trip.
    #[error("Transport error: {message}")]
    Transport {
        /// Description supplied by the transport.
        message: String,
    },

    /// The response body exceeded [`RESPONSE_SIZE_LIMIT`].
    #[error("Response exceeded {limit} bytes")]
    ResponseTooLarge {
        /// The ceiling that was exceeded.
        limit: usize,
    },

    /// The response or its payload was not the expected JSON.
    #[error("Decode error: {message}")]
    Decode {
        /// Description from the JSON decoder.
        message: String,
    },

    /// The call was malformed before it reached the gateway.
    #[error("Invalid call: {message}")]
    InvalidCall {
        /// What was wrong with the call.
        message: String,
    },

    /// The gateway has been released (or the facade never had one).
    #[error("Gateway is closed")]
    Closed,
}

impl GatewayError {
    /// Returns `true` if the control panel itself reported the failure.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Returns the remote failure reason, if this is a remote failure.
    pub fn remote_reason(&self) -> Option<&str> {
        match self {
            Self::Remote(failure) => Some(failure.reason()),
            _ => None,
        }
    }

    /// Returns the informational messages reported with a remote failure.
    pub fn remote_messages(&self) -> Option<&str> {
        match self {
            Self::Remote(failure) => failure.messages(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reason_reads_unknown() {
        assert_eq!(RemoteCallFailure::new("").reason(), "Unknown");
        assert_eq!(RemoteCallFailure::joined::<&str>(&[]).reason(), "Unknown");
    }

    #[test]
    fn reasons_join_with_newlines() {
        let failure = RemoteCallFailure::joined(&["quota exceeded", "disk full"]);
        assert_eq!(failure.to_string(), "quota exceeded\ndisk full");
    }

    #[test]
    fn messages_ride_along_without_changing_the_reason() {
        let failure = RemoteCallFailure::new("quota exceeded")
            .with_messages(Some("mailbox is nearly full".to_owned()));

        assert_eq!(failure.to_string(), "quota exceeded");
        assert_eq!(failure.messages(), Some("mailbox is nearly full"));
        assert_eq!(RemoteCallFailure::unknown().messages(), None);
    }

    #[test]
    fn remote_reason_is_exposed() {
        let err = GatewayError::from(RemoteCallFailure::new("bad user"));
        assert!(err.is_remote());
        assert_eq!(err.remote_reason(), Some("bad user"));
        assert_eq!(err.to_string(), "bad user");
        assert_eq!(GatewayError::Closed.remote_reason(), None);
    }

    #[test]
    fn size_limit_is_five_mebibytes_plus_margin() {
        assert_eq!(RESPONSE_SIZE_LIMIT, 5_244_217);
    }
}
