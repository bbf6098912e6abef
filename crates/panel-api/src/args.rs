//! Call arguments and their per-generation wire encoding.
//!
//! UAPI and API2 send each argument as `key=<value as text>`. API1 is the odd
//! one out: legacy call sites put `name=value` in the *key* position, so the
//! key is split on its first `=` and the mapped value is dropped. A key with
//! no `=` is sent with an empty value. This is kept as-is for compatibility
//! with those call sites; it is not an encoding error.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::{ArgValue, ProtocolGeneration};

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

/// Arguments for one remote call, keyed by name.
///
/// Keys are unique. Iteration (and therefore encoding) follows key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(BTreeMap<String, ArgValue>);

impl Args {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument and returns `self`, for chained construction.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an argument, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ArgValue>,
    ) -> Option<ArgValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no arguments are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encodes the arguments for the given protocol generation.
    pub fn encode(&self, generation: ProtocolGeneration) -> EncodedArgs {
        match generation {
            ProtocolGeneration::Api1 => encode_positional(self.0.keys()),
            ProtocolGeneration::Api2 | ProtocolGeneration::Uapi => self
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_string()))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Into<ArgValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// API1 key splitting
// ---------------------------------------------------------------------------

/// Applies the API1 key rule to a sequence of keys, preserving their order.
///
/// `"user=bob"` becomes `("user", "bob")`; `"verbose"` becomes `("verbose", "")`.
pub fn encode_positional<I, S>(keys: I) -> EncodedArgs
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|key| {
            let key = key.as_ref();
            match key.split_once('=') {
                Some((name, value)) => (name.to_owned(), value.to_owned()),
                None => (key.to_owned(), String::new()),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// EncodedArgs
// ---------------------------------------------------------------------------

/// Wire-ready arguments: an ordered list of string pairs, duplicates allowed.
///
/// Serializes as a sequence of `(key, value)` tuples, which is the shape URL
/// query and form serializers accept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedArgs(Vec<(String, String)>);

impl EncodedArgs {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Returns the first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the pairs in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Number of pairs, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for EncodedArgs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, String)> for EncodedArgs {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for EncodedArgs {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for EncodedArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for pair in &self.0 {
            seq.serialize_element(pair)?;
        }
        seq.end()
    }
}
