//! Error types for the del.icio.us API client.
//!
//! # Design
//! Configuration mistakes (`MissingCredentials`, `TransportNotConfigured`) get
//! dedicated variants because the caller can fix them without touching the
//! network. Structural problems in a response body stay in the same `Error`
//! type: a wrong root element is `UnexpectedRoot`, anything wrong inside a
//! recognized root is `MalformedResponse`, distinguished by message content.

use thiserror::Error;

/// Errors returned by [`Delicious`](crate::Delicious) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The client was constructed with an empty username or password.
    #[error("missing credentials, both username and password are required")]
    MissingCredentials,

    /// A request was issued but no HTTP transport has been injected.
    #[error("no HTTP transport configured")]
    TransportNotConfigured,

    /// The underlying HTTP call failed (network, timeout, connection).
    #[error("request for `{operation}` failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The response root element does not match the one this operation
    /// expects. Usually an authentication failure or a service error page.
    #[error("invalid response, root node is not `{expected}`")]
    UnexpectedRoot { expected: &'static str },

    /// The root element was recognized but the payload inside it is invalid
    /// (missing attribute, non-numeric count).
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response body is not well-formed XML at all.
    #[error("unable to parse response XML: {0}")]
    Xml(String),
}

impl Error {
    /// True for errors the caller can fix before retrying (bad construction
    /// or missing transport), as opposed to transport or response failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingCredentials | Error::TransportNotConfigured)
    }
}
