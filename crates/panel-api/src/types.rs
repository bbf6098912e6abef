//! Shared value types for the protocol layer.
//!
//! [`ProtocolGeneration`] selects which encoding and decoding rules apply to a
//! call. [`ArgValue`] is the closed set of scalars a call argument may carry.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Protocol generations
// ---------------------------------------------------------------------------

/// One of the three calling conventions served by the control panel.
///
/// Fixed for the duration of a call. Each generation has its own argument
/// encoding (see [`crate::Args::encode`]) and its own response envelope (see
/// [`crate::Envelope`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolGeneration {
    /// Legacy positional API. Arguments may pack `name=value` into the key.
    Api1,
    /// Legacy named-argument API wrapped in a `cpanelresult` object.
    Api2,
    /// Modern API served under `/execute/{module}/{function}`.
    Uapi,
}

impl ProtocolGeneration {
    /// Numeric version the control panel uses to identify this generation.
    pub fn api_version(self) -> u8 {
        match self {
            Self::Api1 => 1,
            Self::Api2 => 2,
            Self::Uapi => 3,
        }
    }
}

impl std::fmt::Display for ProtocolGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Api1 => "API1",
            Self::Api2 => "API2",
            Self::Uapi => "UAPI",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Argument values
// ---------------------------------------------------------------------------

/// A single call argument value.
///
/// The wire form is the default textual formatting of the scalar: integers
/// and floats as Rust's `Display` renders them (`5`, `1.5`, `2`), booleans as
/// `true`/`false`, and strings verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// A string value.
    Str(String),
    /// A signed integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl std::fmt::Display for ArgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
