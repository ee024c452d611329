//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method check, route table lookup,
//! dispatch, and the common response finishing (Server header, HEAD bodies,
//! access log).

use crate::config::AppState;
use crate::handler::{images, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::RouteAction;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT,
};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// URL path, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let headers = req.headers();
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            if_modified_since: headers
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok()),
            has_if_none_match: headers.contains_key(IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The body is never read, so any body type is accepted. Every failure is
/// turned into a response; nothing escapes to the connection.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let is_head = *method == Method::HEAD;

    let response = match *method {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext::from_request(&req);
            route_request(&ctx, &state).await
        }
        _ => {
            logger::log_warning(&format!("Method not implemented: {method}"));
            http::build_501_response(method.as_str())
        }
    };

    let response = finish_response(response, &state.config.http.server_name, is_head);

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request through the route table
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match state.routes.resolve(ctx.path) {
        RouteAction::ListImages => images::serve_image_list(&state.image_dir).await,
        RouteAction::Static => static_files::serve_static(ctx, &state.served_root).await,
    }
}

/// Stamp the Server header and drop the body of HEAD responses
///
/// `Content-Length` is left as computed for the full body.
fn finish_response(
    response: Response<Full<Bytes>>,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let (mut parts, body) = response.into_parts();

    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            parts.headers.insert(SERVER, value);
        }
        Err(e) => logger::log_warning(&format!("Invalid server name '{server_name}': {e}")),
    }

    let body = if is_head { Full::new(Bytes::new()) } else { body };
    Response::from_parts(parts, body)
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version());
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
