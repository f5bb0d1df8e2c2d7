//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client over real
//! HTTP with a ureq-backed [`Transport`]. Validates the full chain: request
//! building, basic-auth transport, throttling, and XML response parsing.

use std::time::Instant;

use base64::Engine;
use delicious_core::{Delicious, Error, Options, Transport, TransportResult, MIN_REQUEST_INTERVAL};

/// Executes requests with ureq, sending basic auth and the client's user
/// agent. Non-2xx responses are returned as data so the core sees the body
/// (the real service answers auth failures with an HTML page, not an error).
struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
    authorization: Option<String>,
    user_agent: String,
}

impl UreqTransport {
    fn new(base_url: String, credentials: Option<(&str, &str)>, user_agent: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let authorization = credentials.map(|(username, password)| {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
            format!("Basic {encoded}")
        });
        Self {
            agent,
            base_url,
            authorization,
            user_agent: user_agent.to_string(),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, path: &str, params: &[(String, String)]) -> TransportResult {
        let mut request = self
            .agent
            .get(format!("{}{path}", self.base_url))
            .header("user-agent", self.user_agent.as_str());
        if let Some(authorization) = &self.authorization {
            request = request.header("authorization", authorization.as_str());
        }
        for (key, value) in params {
            request = request.query(key, value);
        }
        let mut response = request.call()?;
        Ok(response.body_mut().read_to_string()?)
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn connected_client(base_url: &str) -> Delicious {
    Delicious::new_with("username", "password", Options::default(), |client| {
        let transport = UreqTransport::new(
            base_url.to_string(),
            Some(("username", "password")),
            client.user_agent(),
        );
        client.set_transport(Some(Box::new(transport)));
    })
    .unwrap()
}

#[test]
fn bundle_and_tag_lifecycle() {
    let base_url = start_server();
    let client = connected_client(&base_url);

    // Seeded bundles come back in service order.
    let bundles = client.bundles_all().unwrap();
    assert_eq!(bundles.len(), 2);
    assert_eq!(bundles[0].name, "music");
    assert_eq!(bundles[0].tags, vec!["ipod", "mp3", "music"]);
    assert_eq!(bundles[1].name, "pc");

    // Create a bundle, observe it listed.
    client.bundles_set("work", &["office", "email"]).unwrap();
    let bundles = client.bundles_all().unwrap();
    assert_eq!(bundles.len(), 3);
    assert_eq!(bundles[2].name, "work");
    assert_eq!(bundles[2].tags, vec!["office", "email"]);

    // Delete one, observe it gone.
    client.bundles_delete("music").unwrap();
    let bundles = client.bundles_all().unwrap();
    assert!(bundles.iter().all(|b| b.name != "music"));

    // Seeded tags with counts, then a rename.
    let tags = client.tags_get().unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].name, "activedesktop");
    assert_eq!(tags[0].count, 1);
    client.tags_rename("business", "productivity").unwrap();
    let tags = client.tags_get().unwrap();
    assert!(tags.iter().any(|t| t.name == "productivity" && t.count == 14));
}

#[test]
fn update_and_account_probe() {
    let base_url = start_server();
    let client = connected_client(&base_url);

    client.update().unwrap();
    assert!(client.valid_account().unwrap());
}

#[test]
fn consecutive_requests_honor_the_rate_limit() {
    let base_url = start_server();
    let client = connected_client(&base_url);

    client.update().unwrap();
    let start = Instant::now();
    client.update().unwrap();
    // Start-to-start spacing implies at least the full interval elapsed
    // between the first call's completion and the second call's start.
    assert!(start.elapsed() >= MIN_REQUEST_INTERVAL);
}

#[test]
fn unauthenticated_responses_fail_root_validation() {
    let base_url = start_server();
    // Transport deliberately sends no Authorization header, so the server
    // answers with its HTML error page.
    let client = Delicious::new_with("username", "password", Options::default(), |client| {
        let transport = UreqTransport::new(base_url.clone(), None, client.user_agent());
        client.set_transport(Some(Box::new(transport)));
    })
    .unwrap();

    let err = client.tags_get().unwrap_err();
    assert!(matches!(err, Error::UnexpectedRoot { expected: "tags" }));

    assert!(!client.valid_account().unwrap());
}
