//! Response envelopes for the three protocol generations.
//!
//! Each generation wraps its payload in a differently shaped JSON object and
//! signals success differently:
//!
//! | Generation | Success when | Failure reason |
//! |------------|--------------|----------------|
//! | UAPI | `result.status == 1` | `result.errors` joined with `\n` |
//! | API2 | `cpanelresult.event.result == 1` | `cpanelresult.event.reason` |
//! | API1 | `error` is empty and `event.result == 1` | `error`, else `event.reason` |
//!
//! A failure with no reason text reads `"Unknown"`. [`Envelope`] is the sum of
//! the three shapes; [`Envelope::error`] (or [`unify`]) is the single place the
//! differing encodings collapse into one [`RemoteCallFailure`].
//!
//! Every field is optional on the wire. Missing fields and JSON `null` decode
//! to their defaults, so a body with no status at all reads as a failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ProtocolGeneration, RemoteCallFailure};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn join_lines(lines: &Option<Vec<String>>) -> Option<String> {
    match lines {
        Some(lines) if !lines.is_empty() => Some(lines.join("\n")),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// UAPI
// ---------------------------------------------------------------------------

/// The `result` object of a UAPI response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UapiResponse {
    /// `1` on success, anything else on failure.
    #[serde(deserialize_with = "null_as_default")]
    pub status: i64,
    /// Failure reasons; only meaningful when `status != 1`.
    pub errors: Option<Vec<String>>,
    /// Informational messages.
    pub messages: Option<Vec<String>>,
    /// Non-fatal warnings.
    pub warnings: Option<Vec<String>>,
    /// Paging and transform details, passed through untouched.
    pub metadata: Value,
    /// The call's result data.
    pub data: Value,
}

impl UapiResponse {
    /// Whether `status == 1`.
    pub fn is_success(&self) -> bool {
        self.status == 1
    }

    /// The unified failure, or `None` when `status == 1`.
    pub fn error(&self) -> Option<RemoteCallFailure> {
        if self.is_success() {
            return None;
        }
        Some(RemoteCallFailure::joined(
            self.errors.as_deref().unwrap_or_default(),
        ))
    }

    /// Informational messages joined with `\n`, regardless of success.
    pub fn message(&self) -> Option<String> {
        join_lines(&self.messages)
    }

    /// Warnings joined with `\n`, regardless of success.
    pub fn warnings(&self) -> Option<String> {
        join_lines(&self.warnings)
    }
}

/// A full UAPI response: the call echo plus the [`UapiResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UapiEnvelope {
    /// Echoed API version, `3` for UAPI.
    pub apiversion: Option<i64>,
    /// Echoed module name.
    pub module: Option<String>,
    /// Echoed function name.
    pub func: Option<String>,
    /// Outcome and payload.
    pub result: UapiResponse,
}

// ---------------------------------------------------------------------------
// API2
// ---------------------------------------------------------------------------

/// The `event` record shared by API1 and API2 responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// `1` on success, anything else on failure.
    #[serde(deserialize_with = "null_as_default")]
    pub result: i64,
    /// Failure reason; may be empty.
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
}

impl EventRecord {
    /// Whether `result == 1`.
    pub fn is_success(&self) -> bool {
        self.result == 1
    }

    fn error(&self) -> Option<RemoteCallFailure> {
        if self.is_success() {
            None
        } else {
            Some(RemoteCallFailure::new(self.reason.as_str()))
        }
    }
}

/// The `cpanelresult` object of an API2 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api2Response {
    /// Echoed API version, `2` for API2.
    pub apiversion: Option<i64>,
    /// Echoed module name.
    pub module: Option<String>,
    /// Echoed function name.
    pub func: Option<String>,
    /// Outcome of the call.
    pub event: EventRecord,
    /// The call's result data.
    pub data: Value,
}

impl Api2Response {
    /// Whether `event.result == 1`.
    pub fn is_success(&self) -> bool {
        self.event.is_success()
    }

    /// The unified failure, or `None` when `event.result == 1`.
    pub fn error(&self) -> Option<RemoteCallFailure> {
        self.event.error()
    }
}

/// A full API2 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api2Envelope {
    /// Outcome and payload.
    pub cpanelresult: Api2Response,
}

impl Api2Envelope {
    /// The unified failure, or `None` on success.
    pub fn error(&self) -> Option<RemoteCallFailure> {
        self.cpanelresult.error()
    }
}

// ---------------------------------------------------------------------------
// API1
// ---------------------------------------------------------------------------

/// The `data` record of an API1 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api1Data {
    /// The function's output as one string.
    #[serde(deserialize_with = "null_as_default")]
    pub result: String,
}

/// An API1 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api1Response {
    /// Top-level error text. Non-empty means failure whatever `event` says.
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
    /// Outcome of the call, consulted when `error` is empty.
    pub event: EventRecord,
    /// The call's output.
    pub data: Api1Data,
}

impl Api1Response {
    /// Whether `error` is empty and `event.result == 1`.
    pub fn is_success(&self) -> bool {
        self.error.is_empty() && self.event.is_success()
    }

    /// The unified failure.
    ///
    /// The top-level `error` string takes precedence; the event reason is only
    /// consulted when it is empty, so a failure is never reported twice.
    pub fn error(&self) -> Option<RemoteCallFailure> {
        if !self.error.is_empty() {
            return Some(RemoteCallFailure::new(self.error.as_str()));
        }
        self.event.error()
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A decoded response of any protocol generation.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A UAPI response.
    Uapi(UapiEnvelope),
    /// An API2 response.
    Api2(Api2Envelope),
    /// An API1 response.
    Api1(Api1Response),
}

impl Envelope {
    /// Decodes a raw response body using the schema of `generation`.
    pub fn decode(generation: ProtocolGeneration, body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match generation {
            ProtocolGeneration::Uapi => Self::Uapi(serde_json::from_slice(body)?),
            ProtocolGeneration::Api2 => Self::Api2(serde_json::from_slice(body)?),
            ProtocolGeneration::Api1 => Self::Api1(serde_json::from_slice(body)?),
        })
    }

    /// The generation this envelope was decoded as.
    pub fn generation(&self) -> ProtocolGeneration {
        match self {
            Self::Uapi(_) => ProtocolGeneration::Uapi,
            Self::Api2(_) => ProtocolGeneration::Api2,
            Self::Api1(_) => ProtocolGeneration::Api1,
        }
    }

    /// The unified failure, or `None` if the call succeeded.
    pub fn error(&self) -> Option<RemoteCallFailure> {
        match self {
            Self::Uapi(env) => env.result.error(),
            Self::Api2(env) => env.error(),
            Self::Api1(resp) => resp.error(),
        }
    }

    /// Informational messages. Only UAPI carries them.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Uapi(env) => env.result.message(),
            Self::Api2(_) | Self::Api1(_) => None,
        }
    }

    /// Warnings. Only UAPI carries them.
    pub fn warnings(&self) -> Option<String> {
        match self {
            Self::Uapi(env) => env.result.warnings(),
            Self::Api2(_) | Self::Api1(_) => None,
        }
    }

    /// Consumes the envelope and returns its result payload.
    ///
    /// For API1 the payload is the `data.result` string.
    pub fn into_payload(self) -> Value {
        match self {
            Self::Uapi(env) => env.result.data,
            Self::Api2(env) => env.cpanelresult.data,
            Self::Api1(resp) => Value::String(resp.data.result),
        }
    }
}

/// Collapses an envelope's success/failure fields into one result.
pub fn unify(envelope: &Envelope) -> Result<(), RemoteCallFailure> {
    match envelope.error() {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}
