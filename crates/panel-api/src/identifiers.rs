//! Newtype call identifiers.
//!
//! A remote call is addressed by a module and a function name. Both are plain
//! strings on the wire, but keeping them as distinct newtypes stops a caller
//! from swapping the two at a call site.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// A control-panel module name (e.g. `"Email"`, `"Mysql"`, `"Serverinfo"`).
    ModuleName
}

string_id! {
    /// A function within a module (e.g. `"list_pops"`, `"servicestatus"`).
    FunctionName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        assert!(ModuleName::new("").is_none());
        assert!(FunctionName::new(String::new()).is_none());
    }

    #[test]
    fn names_display_verbatim() {
        let module = ModuleName::new("Email").unwrap();
        assert_eq!(module.to_string(), "Email");
        assert_eq!(module.as_str(), "Email");
    }
}
