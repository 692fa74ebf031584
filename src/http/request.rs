//! Request identity and request-head rendering.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client did not send one
//! - Expose the ID to handlers and tracing spans
//! - Remember whether the ID came from the client or was generated here
//! - Render a request head back as text for the `/request` dumper

use axum::extract::Request as AxumRequest;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Sets `x-request-id` on incoming requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuidV4> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4)
}

/// Copies `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Where a request's `x-request-id` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestIdOrigin {
    Client,
    Generated,
}

impl RequestIdOrigin {
    pub fn of(headers: &HeaderMap) -> Self {
        if headers.contains_key(X_REQUEST_ID) {
            Self::Client
        } else {
            Self::Generated
        }
    }
}

/// Records the [`RequestIdOrigin`] as a request extension. Must run outside
/// [`set_request_id_layer`], before the header can be filled in.
pub async fn record_request_id_origin(mut request: AxumRequest, next: Next) -> Response {
    let origin = RequestIdOrigin::of(request.headers());
    request.extensions_mut().insert(origin);
    next.run(request).await
}

/// Access to the request ID stored by [`set_request_id_layer`].
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Canonical MIME form of a header name: first letter and every letter
/// after a hyphen upper-cased, the rest lower-cased (`user-agent` →
/// `User-Agent`). Names with characters outside `[A-Za-z0-9-]` are returned
/// unchanged.
pub fn canonical_header_name(name: &str) -> String {
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

/// Render `METHOD TARGET\r\n` followed by one `Name: value\r\n` line per
/// received header, in received order.
pub fn render_request_head(method: &Method, target: &Uri, headers: &HeaderMap) -> String {
    let mut out = format!("{method} {target}\r\n");
    for (name, value) in headers {
        out.push_str(&canonical_header_name(name.as_str()));
        out.push_str(": ");
        out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        out.push_str("\r\n");
    }
    out
}
