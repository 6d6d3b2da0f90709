#![forbid(unsafe_code)]

//! Error taxonomy for the routing core.
//!
//! Only malformed wire payloads are errors. Everything else (unknown
//! actions, handlers that all decline, notifications for stale bindings)
//! degrades gracefully and is reported through [`RouteOutcome`] or a
//! silent no-op, never through `Err`.
//!
//! # Failure Modes
//!
//! | Condition | Representation | Host default |
//! |-----------|----------------|--------------|
//! | Malformed payload | `Err(DecodeError)` | fatal for the request, re-sync |
//! | Unknown action / no `Action` key | `RouteOutcome::NotHandled` | request re-sync |
//! | All handlers decline | `RouteOutcome::NotHandled` | designed fallthrough |
//! | Stale binding notification | silent no-op | none |

/// Failure to decode a raw wire payload into a parameter bag.
///
/// Never retried; the host treats it as fatal for the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload was not parseable at all.
    MalformedPayload {
        /// Parser diagnostic.
        detail: String,
    },
    /// The payload parsed but was not a key/value object.
    NotAnObject,
    /// A registered parameter was present with the wrong shape.
    BadParameter {
        /// Parameter key.
        key: String,
        /// What the registered schema expected.
        expected: &'static str,
        /// What the payload carried.
        found: String,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedPayload { detail } => write!(f, "malformed payload: {detail}"),
            Self::NotAnObject => write!(f, "payload is not an object"),
            Self::BadParameter {
                key,
                expected,
                found,
            } => {
                write!(f, "parameter '{key}': expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Result of routing one decoded event.
///
/// `NotHandled` is not an error: it covers the missing-`Action` and
/// unknown-action cases as well as the designed fallthrough where every
/// registered handler declined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A handler claimed the event; dispatch stopped there.
    Handled,
    /// No handler claimed the event.
    NotHandled,
}

impl RouteOutcome {
    /// Whether a handler claimed the event.
    #[must_use]
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_messages_name_the_parameter() {
        let err = DecodeError::BadParameter {
            key: "slot".into(),
            expected: "integer",
            found: "\"abc\"".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("slot"), "message should name the key: {msg}");
        assert!(msg.contains("integer"));
    }

    #[test]
    fn route_outcome_predicate() {
        assert!(RouteOutcome::Handled.is_handled());
        assert!(!RouteOutcome::NotHandled.is_handled());
    }
}
