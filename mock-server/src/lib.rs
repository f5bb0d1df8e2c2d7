//! In-process stand-in for the del.icio.us v1 XML API, used by the core
//! crate's integration tests. State starts from the canonical fixture data
//! (two bundles, two tags) so list responses are deterministic. Requests
//! without an `Authorization` header get the service's HTML error page, which
//! is how the real service answers unauthenticated calls.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug)]
pub struct BundleRecord {
    pub name: String,
    pub tags: String,
}

#[derive(Clone, Debug)]
pub struct TagRecord {
    pub name: String,
    pub count: u32,
}

#[derive(Debug)]
pub struct ApiState {
    pub bundles: Vec<BundleRecord>,
    pub tags: Vec<TagRecord>,
}

impl ApiState {
    /// The fixture data every fresh server starts from.
    fn seeded() -> Self {
        Self {
            bundles: vec![
                BundleRecord {
                    name: "music".to_string(),
                    tags: "ipod mp3 music".to_string(),
                },
                BundleRecord {
                    name: "pc".to_string(),
                    tags: "computer software hardware".to_string(),
                },
            ],
            tags: vec![
                TagRecord {
                    name: "activedesktop".to_string(),
                    count: 1,
                },
                TagRecord {
                    name: "business".to_string(),
                    count: 14,
                },
            ],
        }
    }
}

pub type Db = Arc<RwLock<ApiState>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(ApiState::seeded()));
    Router::new()
        .route("/v1/posts/update", get(posts_update))
        .route("/v1/tags/bundles/all", get(bundles_all))
        .route("/v1/tags/bundles/set", get(bundles_set))
        .route("/v1/tags/bundles/delete", get(bundles_delete))
        .route("/v1/tags/get", get(tags_get))
        .route("/v1/tags/rename", get(tags_rename))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

const ERROR_PAGE: &str = "<html><body><h1>401 Unauthorized</h1></body></html>";

/// The real service rejects unauthenticated requests with an HTML page, not
/// an API document. Reproducing that here exercises the client's
/// root-validation path end-to-end.
fn require_auth(headers: &HeaderMap) -> Result<(), Response> {
    if headers.contains_key(header::AUTHORIZATION) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, html(ERROR_PAGE)).into_response())
    }
}

fn xml(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{body}"),
    )
        .into_response()
}

fn html(body: &str) -> Response {
    ([(header::CONTENT_TYPE, "text/html")], body.to_string()).into_response()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn posts_update(headers: HeaderMap) -> Response {
    if let Err(resp) = require_auth(&headers) {
        return resp;
    }
    xml("<update time=\"2008-03-12T08:41:20Z\" inboxnew=\"0\"/>".to_string())
}

async fn bundles_all(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_auth(&headers) {
        return resp;
    }
    let state = db.read().await;
    let mut body = String::from("<bundles>\n");
    for bundle in &state.bundles {
        body.push_str(&format!(
            "  <bundle name=\"{}\" tags=\"{}\"/>\n",
            escape_attr(&bundle.name),
            escape_attr(&bundle.tags)
        ));
    }
    body.push_str("</bundles>");
    xml(body)
}

async fn bundles_set(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = require_auth(&headers) {
        return resp;
    }
    let (name, tags) = match (params.get("bundle"), params.get("tags")) {
        (Some(name), Some(tags)) => (name.clone(), tags.clone()),
        _ => return xml("<result code=\"you must supply a bundle name\"/>".to_string()),
    };
    let mut state = db.write().await;
    match state.bundles.iter_mut().find(|b| b.name == name) {
        Some(existing) => existing.tags = tags,
        None => state.bundles.push(BundleRecord { name, tags }),
    }
    xml("<result code=\"done\"/>".to_string())
}

async fn bundles_delete(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = require_auth(&headers) {
        return resp;
    }
    if let Some(name) = params.get("bundle") {
        db.write().await.bundles.retain(|b| &b.name != name);
    }
    xml("<result code=\"done\"/>".to_string())
}

async fn tags_get(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_auth(&headers) {
        return resp;
    }
    let state = db.read().await;
    let mut body = String::from("<tags>\n");
    for tag in &state.tags {
        body.push_str(&format!(
            "  <tag count=\"{}\" tag=\"{}\"/>\n",
            tag.count,
            escape_attr(&tag.name)
        ));
    }
    body.push_str("</tags>");
    xml(body)
}

async fn tags_rename(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = require_auth(&headers) {
        return resp;
    }
    if let (Some(old), Some(new)) = (params.get("old"), params.get("new")) {
        let mut state = db.write().await;
        if let Some(tag) = state.tags.iter_mut().find(|t| &t.name == old) {
            tag.name = new.clone();
        }
    }
    xml("<result code=\"done\"/>".to_string())
}
