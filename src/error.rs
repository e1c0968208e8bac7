//! Structured error types for the rendering pipeline.
//!
//! The taxonomy deliberately separates "template broken" from "data missing":
//! a malformed template fails compilation fast and loud, while a missing
//! document field is not an error at all (the binder degrades it to empty
//! output). Asset failures never appear here either; they are logged and
//! degraded inside layout.

use thiserror::Error;

/// The unified error type returned by the public rendering API.
#[derive(Debug, Error)]
pub enum VitaeError {
    /// A template failed to compile. Carries the template identity so the
    /// consumer can display a bounded error block naming the offender.
    #[error("template '{name}' ({id}) is invalid at byte {position}: {message}")]
    Template {
        id: String,
        name: String,
        message: String,
        position: usize,
    },

    /// The input document failed to deserialize as a resume.
    #[error("failed to parse resume document: {source}{}", hint_suffix(.hint))]
    Document {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A font could not be loaded or parsed.
    #[error("font error: {0}")]
    Font(String),

    /// Layout or PDF serialization failed unexpectedly.
    #[error("render error: {0}")]
    Render(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  hint: {hint}")
    }
}

impl From<serde_json::Error> for VitaeError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "check for trailing commas, missing quotes, or unescaped characters".to_string()
            }
            serde_json::error::Category::Data => {
                "the JSON is valid but does not match the resume schema; check field names and types"
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "unexpected end of input, the JSON may be truncated".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        VitaeError::Document { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_carries_hint() {
        let err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let e = VitaeError::from(err);
        let msg = e.to_string();
        assert!(msg.contains("hint:"), "syntax errors should carry a hint: {msg}");
    }

    #[test]
    fn test_template_error_names_offender() {
        let e = VitaeError::Template {
            id: "onyx".into(),
            name: "Onyx".into(),
            message: "mismatched closing tag".into(),
            position: 42,
        };
        let msg = e.to_string();
        assert!(msg.contains("onyx"));
        assert!(msg.contains("Onyx"));
        assert!(msg.contains("42"));
    }
}
