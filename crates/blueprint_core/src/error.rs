//! Blueprint error types
//!
//! Every message starts with [`TAG`] in brackets so callers can tell errors
//! raised by the framework apart from errors raised by their own code.

use thiserror::Error;

/// Library tag prefixed to every error message.
pub const TAG: &str = "d3-blueprint";

/// Errors raised by the blueprint crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlueprintError {
    /// A config property was defined twice
    #[error("[d3-blueprint] config \"{0}\" is already defined")]
    AlreadyDefined(String),

    /// A config property was read or written before being defined
    #[error("[d3-blueprint] config \"{0}\" is not defined")]
    NotDefined(String),

    /// A config property was read or written with the wrong type
    #[error("[d3-blueprint] config \"{name}\" holds values of type {expected}")]
    ConfigType {
        name: String,
        expected: &'static str,
    },

    /// A layer was looked up by a name that was never registered
    #[error("[d3-blueprint] layer \"{0}\" is not defined")]
    UnknownLayer(String),

    /// An attachment was looked up by a name that was never registered
    #[error("[d3-blueprint] attachment \"{0}\" is not defined")]
    UnknownAttachment(String),

    /// A layer handler key outside the lifecycle vocabulary
    #[error("[d3-blueprint] \"{key}\" is not a valid lifecycle event. Expected one of: {expected}")]
    InvalidLifecycleEvent { key: String, expected: String },

    /// A plain handler under a `:transition` key, or the reverse
    #[error("[d3-blueprint] handler kind does not match lifecycle event \"{0}\"")]
    HandlerKind(String),

    /// A dispatcher event type that the dispatcher was not created with
    #[error("[d3-blueprint] unknown event type: \"{0}\"")]
    UnknownEvent(String),
}

/// Result type for blueprint operations
pub type Result<T> = std::result::Result<T, BlueprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_library_tag() {
        let errors = [
            BlueprintError::AlreadyDefined("width".into()),
            BlueprintError::NotDefined("width".into()),
            BlueprintError::UnknownLayer("bars".into()),
            BlueprintError::UnknownAttachment("axes".into()),
            BlueprintError::UnknownEvent("resize".into()),
            BlueprintError::HandlerKind("enter".into()),
        ];

        let prefix = format!("[{TAG}] ");
        for error in errors {
            assert!(error.to_string().starts_with(&prefix), "{error}");
        }
    }

    #[test]
    fn test_messages_name_the_offender() {
        assert_eq!(
            BlueprintError::NotDefined("height".into()).to_string(),
            "[d3-blueprint] config \"height\" is not defined"
        );
        assert_eq!(
            BlueprintError::UnknownLayer("bars".into()).to_string(),
            "[d3-blueprint] layer \"bars\" is not defined"
        );
    }
}
