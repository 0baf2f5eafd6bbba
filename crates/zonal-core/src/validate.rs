//! Outbound message body validation.
//!
//! Synchronous and side-effect free so it can run both ahead of a network
//! send and in isolation (form-field validation) without a live session.
//! Rules apply in order; the first failing rule wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ceiling on message body length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Fixed set of unsafe-content markers, matched case-insensitively.
///
/// Script tags, inline event handlers, embed-style tags, and the
/// `javascript:` scheme. Matching is plain substring containment on the
/// lowercased body.
const UNSAFE_PATTERNS: &[&str] = &[
    "<script",
    "</script",
    "<iframe",
    "<object",
    "<embed",
    "javascript:",
    "onclick=",
    "onerror=",
    "onload=",
    "onmouseover=",
    "onfocus=",
];

/// Why a message body was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Trimmed body is empty
    Empty,
    /// Body exceeds [`MAX_MESSAGE_CHARS`]
    TooLong,
    /// Body matches an unsafe-content pattern
    InvalidContent,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::Empty => "empty",
            RejectReason::TooLong => "too long",
            RejectReason::InvalidContent => "invalid content",
        };
        write!(f, "{}", s)
    }
}

/// Validate an outbound message body.
///
/// Returns `Ok(())` for sendable bodies, or the first failing
/// [`RejectReason`] in rule order: emptiness, length ceiling, content
/// safety.
pub fn validate_body(body: &str) -> Result<(), RejectReason> {
    if body.trim().is_empty() {
        return Err(RejectReason::Empty);
    }

    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(RejectReason::TooLong);
    }

    let lowered = body.to_lowercase();
    if UNSAFE_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return Err(RejectReason::InvalidContent);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_body_is_rejected() {
        assert_eq!(validate_body(""), Err(RejectReason::Empty));
        assert_eq!(validate_body("   \t\n"), Err(RejectReason::Empty));
    }

    #[test]
    fn overlong_body_is_rejected() {
        let body = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(validate_body(&body), Err(RejectReason::TooLong));
        // Exactly at the ceiling passes
        let body = "a".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(validate_body(&body), Ok(()));
    }

    #[test]
    fn unsafe_content_is_rejected() {
        assert_eq!(
            validate_body("<script>x</script>"),
            Err(RejectReason::InvalidContent)
        );
        assert_eq!(
            validate_body("<SCRIPT>x</SCRIPT>"),
            Err(RejectReason::InvalidContent)
        );
        assert_eq!(
            validate_body("click javascript:alert(1)"),
            Err(RejectReason::InvalidContent)
        );
        assert_eq!(
            validate_body("<img onerror=alert(1)>"),
            Err(RejectReason::InvalidContent)
        );
        assert_eq!(
            validate_body("<iframe src=x>"),
            Err(RejectReason::InvalidContent)
        );
    }

    #[test]
    fn plain_text_is_accepted() {
        assert_eq!(validate_body("Hello zone"), Ok(()));
        assert_eq!(validate_body("Power restored on Marina road."), Ok(()));
    }

    #[test]
    fn emptiness_wins_over_length() {
        // A body of only whitespace longer than the ceiling still reports
        // "empty" - rules apply in order.
        let body = " ".repeat(MAX_MESSAGE_CHARS + 5);
        assert_eq!(validate_body(&body), Err(RejectReason::Empty));
    }

    proptest! {
        #[test]
        fn accepted_bodies_are_bounded_and_clean(body in "[a-zA-Z0-9 .,!?]{1,1000}") {
            prop_assume!(!body.trim().is_empty());
            prop_assert_eq!(validate_body(&body), Ok(()));
        }

        #[test]
        fn verdict_is_deterministic(body in ".*") {
            prop_assert_eq!(validate_body(&body), validate_body(&body));
        }
    }
}
