//! The decoding path every gateway shares once it holds a response body.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{Envelope, GatewayError, ProtocolGeneration, RESPONSE_SIZE_LIMIT};

/// What a successful call yields. Gateways return this from every call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutput {
    /// The opaque result payload.
    pub payload: Value,
    /// Informational messages (UAPI only), joined with `\n`.
    pub messages: Option<String>,
}

/// Turns a raw response body into a payload or a unified error.
///
/// Applies [`RESPONSE_SIZE_LIMIT`], decodes the envelope for `generation`,
/// and maps a failed envelope to [`GatewayError::Remote`]. Messages are
/// returned to the caller on both paths: in [`CallOutput::messages`] on
/// success, in [`crate::RemoteCallFailure::messages`] on failure. Neither
/// messages nor warnings are ever treated as failures.
pub fn decode_response(
    generation: ProtocolGeneration,
    body: &[u8],
) -> Result<CallOutput, GatewayError> {
    if body.len() > RESPONSE_SIZE_LIMIT {
        return Err(GatewayError::ResponseTooLarge {
            limit: RESPONSE_SIZE_LIMIT,
        });
    }

    let envelope = Envelope::decode(generation, body)?;

    let messages = envelope.message();
    if let Some(messages) = &messages {
        debug!(%generation, messages = messages.as_str(), "remote call messages");
    }
    if let Some(warnings) = envelope.warnings() {
        warn!(%generation, warnings = warnings.as_str(), "remote call warnings");
    }

    if let Some(failure) = envelope.error() {
        debug!(%generation, reason = failure.reason(), "remote call failed");
        return Err(failure.with_messages(messages).into());
    }

    Ok(CallOutput {
        payload: envelope.into_payload(),
        messages,
    })
}
