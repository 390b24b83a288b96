// Error taxonomy shared by the API client and the controller.
// The `Display` output of each variant is exactly what the user sees.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Build requested with nothing selected.
    #[error("Please upload at least one PDF before building the index.")]
    NoDocuments,

    /// Question was empty or whitespace only.
    #[error("Please enter a question.")]
    EmptyQuestion,

    /// A document declared a media type that cannot be sent.
    #[error("Invalid media type '{media_type}' for {filename}")]
    InvalidMediaType { filename: String, media_type: String },

    /// The backend could not be reached at all (DNS, connect, timeout).
    #[error("Failed to reach backend: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {detail}")]
    Backend { status: u16, detail: String },

    /// The backend answered 200 with a body we could not decode.
    #[error("Malformed response from backend: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Wrap a transport-level error, keeping its whole source chain so
    /// "error sending request" is followed by the actual cause.
    pub fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut cause = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            let text = inner.to_string();
            if !cause.ends_with(&text) {
                cause.push_str(": ");
                cause.push_str(&text);
            }
            source = inner.source();
        }
        ClientError::Transport(cause)
    }

    /// Local faults caught before any request is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::NoDocuments
                | ClientError::EmptyQuestion
                | ClientError::InvalidMediaType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn transport_message_includes_source_chain() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer("connection refused", None))),
        );
        assert_eq!(
            ClientError::transport(&err).to_string(),
            "Failed to reach backend: error sending request: connection refused"
        );
    }

    #[test]
    fn backend_message_format() {
        let err = ClientError::Backend {
            status: 500,
            detail: "index corrupt".into(),
        };
        assert_eq!(err.to_string(), "Backend error (500): index corrupt");
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_faults_are_flagged() {
        assert!(ClientError::NoDocuments.is_validation());
        assert!(ClientError::EmptyQuestion.is_validation());
        assert!(!ClientError::Transport("timed out".into()).is_validation());
    }
}
