//! Synchronous client core for the del.icio.us v1 API.
//!
//! # Overview
//! Authenticated, rate-limited access to the bookmarking service's XML API:
//! update polling, bundle management and tag management. HTTP execution is
//! injected through the [`Transport`] trait, so the core itself never opens a
//! socket and every operation can be tested against fixture XML or the
//! workspace mock server.
//!
//! # Design
//! - `Delicious` owns the credentials, the user agent and a throttled
//!   transport; the throttle spaces requests at least [`MIN_REQUEST_INTERVAL`]
//!   apart per instance, failed calls included.
//! - Every response goes through root-element validation before any payload
//!   is read; a foreign root is reported as [`Error::UnexpectedRoot`] naming
//!   the element the operation expected.
//! - All failures are part of each operation's `Result` contract — nothing is
//!   swallowed or retried internally.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::{Delicious, Options};
pub use error::Error;
pub use transport::{Transport, TransportResult, MIN_REQUEST_INTERVAL};
pub use types::{Bundle, Tag};
