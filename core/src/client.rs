//! The del.icio.us client: operation orchestration and response parsing.
//!
//! # Design
//! Each public operation builds its path and query parameters, issues the
//! request through the throttled transport, and hands the raw body to the
//! matching `parse_*` method. The parse methods are pure functions of the
//! body text — they touch no client state and can be exercised directly with
//! fixture XML, which is how most of the tests below work.

use crate::error::Error;
use crate::transport::{ThrottledTransport, Transport};
use crate::types::{Bundle, Tag};
use crate::xml;

const PATH_UPDATE: &str = "/v1/posts/update";
const PATH_BUNDLES_ALL: &str = "/v1/tags/bundles/all";
const PATH_BUNDLES_SET: &str = "/v1/tags/bundles/set";
const PATH_BUNDLES_DELETE: &str = "/v1/tags/bundles/delete";
const PATH_TAGS_GET: &str = "/v1/tags/get";
const PATH_TAGS_RENAME: &str = "/v1/tags/rename";

/// Default user agent: library name and version plus the host runtime,
/// resolved at compile time so the string is deterministic.
const DEFAULT_USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " Rust/",
    env!("CARGO_PKG_RUST_VERSION"),
);

/// Optional construction-time configuration for [`Delicious`].
///
/// Everything here has a usable default: without a `user_agent` the library's
/// own identifying string is sent, and without a `transport` the client
/// constructs fine but fails any request with
/// [`Error::TransportNotConfigured`] until one is injected.
#[derive(Default)]
pub struct Options {
    pub user_agent: Option<String>,
    pub transport: Option<Box<dyn Transport>>,
}

/// Synchronous client for the del.icio.us v1 API.
///
/// Holds the account credentials, the identifying user agent, and the
/// throttled transport. One instance serializes its own requests; callers
/// needing parallelism run one instance per thread, each with its own
/// throttle clock.
pub struct Delicious {
    username: String,
    password: String,
    user_agent: String,
    transport: ThrottledTransport,
}

impl Delicious {
    /// Build a client for the given account.
    ///
    /// Both credentials must be non-empty; anything else is a caller error
    /// reported as [`Error::MissingCredentials`] before any request is made.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        options: Options,
    ) -> Result<Self, Error> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Self {
            username,
            password,
            user_agent: options.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            transport: ThrottledTransport::new(options.transport),
        })
    }

    /// Like [`new`](Self::new), but runs `setup` on the freshly built client
    /// before returning it, so deferred configuration (typically injecting
    /// the transport) can happen in one expression.
    pub fn new_with<F>(
        username: impl Into<String>,
        password: impl Into<String>,
        options: Options,
        setup: F,
    ) -> Result<Self, Error>
    where
        F: FnOnce(&mut Self),
    {
        let mut client = Self::new(username, password, options)?;
        setup(&mut client);
        Ok(client)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    /// Inject (or clear) the HTTP transport used for all requests.
    pub fn set_transport(&mut self, transport: Option<Box<dyn Transport>>) {
        self.transport.set_inner(transport);
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_configured()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Check the time of the last posts update. Presence of the `update`
    /// root is the whole answer; the service sends no further payload this
    /// client cares about.
    pub fn update(&self) -> Result<(), Error> {
        let body = self.transport.send("update", PATH_UPDATE, &[])?;
        self.parse_update(&body)
    }

    /// Fetch all bundles for the account, in the order the service lists
    /// them.
    pub fn bundles_all(&self) -> Result<Vec<Bundle>, Error> {
        let body = self.transport.send("bundles_all", PATH_BUNDLES_ALL, &[])?;
        self.parse_bundles_all(&body)
    }

    /// Create or replace the bundle `name` with the given tags.
    pub fn bundles_set(&self, name: &str, tags: &[&str]) -> Result<(), Error> {
        let params = vec![
            ("bundle".to_string(), name.to_string()),
            ("tags".to_string(), tags.join(" ")),
        ];
        let body = self.transport.send("bundles_set", PATH_BUNDLES_SET, &params)?;
        self.parse_bundles_set(&body)
    }

    /// Delete the bundle `name`.
    pub fn bundles_delete(&self, name: &str) -> Result<(), Error> {
        let params = vec![("bundle".to_string(), name.to_string())];
        let body = self
            .transport
            .send("bundles_delete", PATH_BUNDLES_DELETE, &params)?;
        self.parse_bundles_delete(&body)
    }

    /// Fetch all tags with their usage counts, in document order.
    pub fn tags_get(&self) -> Result<Vec<Tag>, Error> {
        let body = self.transport.send("tags_get", PATH_TAGS_GET, &[])?;
        self.parse_tags_get(&body)
    }

    /// Rename tag `old` to `new` across all posts.
    pub fn tags_rename(&self, old: &str, new: &str) -> Result<(), Error> {
        let params = vec![
            ("old".to_string(), old.to_string()),
            ("new".to_string(), new.to_string()),
        ];
        let body = self.transport.send("tags_rename", PATH_TAGS_RENAME, &params)?;
        self.parse_tags_rename(&body)
    }

    /// Probe whether the account credentials are accepted by the service.
    ///
    /// The service answers bad credentials with an error page rather than an
    /// API document, so a structurally wrong response here means "no". Any
    /// transport or configuration failure still propagates.
    pub fn valid_account(&self) -> Result<bool, Error> {
        match self.update() {
            Ok(()) => Ok(true),
            Err(Error::UnexpectedRoot { .. }) | Err(Error::Xml(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    // -----------------------------------------------------------------------
    // Response parsing
    // -----------------------------------------------------------------------

    /// Parse an `update` response: the root element is the whole payload.
    pub fn parse_update(&self, body: &str) -> Result<(), Error> {
        let doc = xml::parse(body)?;
        xml::expect_root(&doc, "update")?;
        Ok(())
    }

    /// Parse a `bundles` response into bundles in document order. Each
    /// `bundle` child carries its name and a space-separated `tags`
    /// attribute. No children means no bundles, which is a valid answer.
    pub fn parse_bundles_all(&self, body: &str) -> Result<Vec<Bundle>, Error> {
        let doc = xml::parse(body)?;
        let root = xml::expect_root(&doc, "bundles")?;
        root.children
            .iter()
            .map(|child| {
                let name = child.require_attr("name")?.to_string();
                let tags = child
                    .require_attr("tags")?
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                Ok(Bundle { name, tags })
            })
            .collect()
    }

    /// Parse a bundle-set acknowledgement: a `result` root means it worked.
    pub fn parse_bundles_set(&self, body: &str) -> Result<(), Error> {
        self.parse_result(body)
    }

    /// Parse a bundle-delete acknowledgement.
    pub fn parse_bundles_delete(&self, body: &str) -> Result<(), Error> {
        self.parse_result(body)
    }

    /// Parse a `tags` response into tags in document order. Each `tag` child
    /// carries the tag name in its `tag` attribute and a numeric `count`.
    pub fn parse_tags_get(&self, body: &str) -> Result<Vec<Tag>, Error> {
        let doc = xml::parse(body)?;
        let root = xml::expect_root(&doc, "tags")?;
        root.children
            .iter()
            .map(|child| {
                let name = child.require_attr("tag")?.to_string();
                let raw_count = child.require_attr("count")?;
                let count = raw_count.parse::<u32>().map_err(|_| {
                    Error::MalformedResponse(format!(
                        "tag `{name}` has a non-numeric `count` attribute `{raw_count}`"
                    ))
                })?;
                Ok(Tag { name, count })
            })
            .collect()
    }

    /// Parse a tag-rename acknowledgement.
    pub fn parse_tags_rename(&self, body: &str) -> Result<(), Error> {
        self.parse_result(body)
    }

    /// Shared acknowledgement shape: a bare `result` root, no payload.
    fn parse_result(&self, body: &str) -> Result<(), Error> {
        let doc = xml::parse(body)?;
        xml::expect_root(&doc, "result")?;
        Ok(())
    }
}

impl std::fmt::Debug for Delicious {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials stay out of Debug output.
        f.debug_struct("Delicious")
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .field("has_transport", &self.transport.is_configured())
            .finish()
    }
}
