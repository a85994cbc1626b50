//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// The `error_kind` tree says what went wrong and is what callers match on;
/// `source` holds the lower-level error that caused it, when there is one.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Protocol(ProtocolErrorKind),
    Document(DocumentErrorKind),
    Payload(PayloadErrorKind),
}

/// Event sequences the renderer refuses to process. These are fatal to the call
/// that delivered the event and must reach the caller.
#[derive(Debug, PartialEq)]
pub enum ProtocolErrorKind {
    MessageBeforeOpen,
    MessageAfterClose,
}

/// Failures of the injected document.
#[derive(Debug, PartialEq)]
pub enum DocumentErrorKind {
    /// No element with id `main` exists to host the list.
    MainRegionMissing,
    /// A node handle does not belong to the document.
    NodeNotFound,
    /// The requested insertion would make a node its own ancestor.
    HierarchyRequest,
}

/// Failures interpreting a message payload as structured data.
#[derive(Debug, PartialEq)]
pub enum PayloadErrorKind {
    Json,
}

impl Error {
    pub fn new(error_kind: DomainErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }

    pub fn protocol(kind: ProtocolErrorKind) -> Self {
        Self::new(DomainErrorKind::Protocol(kind))
    }

    pub fn document(kind: DocumentErrorKind) -> Self {
        Self::new(DomainErrorKind::Document(kind))
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self.error_kind, DomainErrorKind::Protocol(_))
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainErrorKind::Protocol(ProtocolErrorKind::MessageBeforeOpen) => {
                write!(f, "protocol violation: message before open")
            }
            DomainErrorKind::Protocol(ProtocolErrorKind::MessageAfterClose) => {
                write!(f, "protocol violation: message after close")
            }
            DomainErrorKind::Document(DocumentErrorKind::MainRegionMissing) => {
                write!(f, "document error: main region missing")
            }
            DomainErrorKind::Document(DocumentErrorKind::NodeNotFound) => {
                write!(f, "document error: node not found")
            }
            DomainErrorKind::Document(DocumentErrorKind::HierarchyRequest) => {
                write!(f, "document error: invalid hierarchy request")
            }
            DomainErrorKind::Payload(PayloadErrorKind::Json) => {
                write!(f, "payload error: invalid JSON")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.error_kind)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Payload(PayloadErrorKind::Json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_before_open_display() {
        let err = Error::protocol(ProtocolErrorKind::MessageBeforeOpen);
        assert_eq!(err.to_string(), "protocol violation: message before open");
        assert!(err.is_protocol_violation());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_payload_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Payload(PayloadErrorKind::Json)
        );
        assert!(!err.is_protocol_violation());
        assert!(err.source().is_some());
    }
}
