//! Newtype identifiers for domain entities.
//!
//! Wrapping each id kind prevents accidentally passing an [`IssueId`] where a
//! [`WorkspaceId`] is expected at a call site.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string as an id.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper, returning the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(WorkspaceId);
string_id!(IssueId);

macro_rules! int_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw integer id.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Return the raw integer value.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

int_id!(CommentId);
int_id!(PlanId);
int_id!(EventId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_id_round_trips_through_display() {
        let id = IssueId::new("arc.a1b2c3");
        assert_eq!(format!("{id}"), "arc.a1b2c3");
        assert_eq!(id.as_str(), "arc.a1b2c3");
    }

    #[test]
    fn comment_id_holds_raw_value() {
        let id = CommentId::new(42);
        assert_eq!(id.value(), 42);
    }
}
