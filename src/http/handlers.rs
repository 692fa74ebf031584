//! Route handlers.
//!
//! Every handler is stateless across requests; the only shared data is the
//! immutable [`AppState`].

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Extension, OriginalUri, RawQuery, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::{render_request_head, RequestIdOrigin, X_REQUEST_ID};
use crate::http::server::AppState;

pub const X_GO_HTTP_INSTANCE: HeaderName = HeaderName::from_static("x-go-http-instance");

/// Upper bound for `/sleep`.
pub const MAX_SLEEP_SECS: f64 = 60.0;

/// `/` and, in the full profile, every unmatched path.
pub async fn root(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Response {
    let body = format!("Requested URI: {uri}");
    if state.config.profile.sends_instance_header() {
        ([(X_GO_HTTP_INSTANCE, state.instance_header.clone())], body).into_response()
    } else {
        body.into_response()
    }
}

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    state.readiness.check().await.status_code()
}

pub async fn livez(State(state): State<AppState>) -> StatusCode {
    state.liveness.check().await.status_code()
}

/// `/sleep?sleep=<seconds>`: holds only this request's task.
pub async fn sleep(State(state): State<AppState>, RawQuery(query): RawQuery) -> String {
    let seconds = requested_sleep(query.as_deref());
    if seconds > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    }
    format!("{}: slept {:.6} seconds\n", state.config.hostname, seconds)
}

pub async fn ip(ConnectInfo(peer): ConnectInfo<SocketAddr>) -> String {
    display_peer(peer)
}

/// IPv4 peers reaching a dual-stack listener arrive as `::ffff:a.b.c.d`;
/// they are reported in plain IPv4 form.
pub fn display_peer(peer: SocketAddr) -> String {
    SocketAddr::new(peer.ip().to_canonical(), peer.port()).to_string()
}

/// `/request`: echoes the request line and the client's headers as plain
/// text. A request ID added by the server is not part of the echo.
pub async fn request_dump(
    method: Method,
    OriginalUri(uri): OriginalUri,
    Extension(origin): Extension<RequestIdOrigin>,
    mut headers: HeaderMap,
) -> impl IntoResponse {
    if origin == RequestIdOrigin::Generated {
        headers.remove(X_REQUEST_ID);
    }
    (
        [(CONTENT_TYPE, "text/plain")],
        render_request_head(&method, &uri, &headers),
    )
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Seconds to sleep for a raw query string.
///
/// Takes the first decodable `sleep` parameter. Missing, non-numeric and NaN
/// values become zero; the result is clamped to `[0, MAX_SLEEP_SECS]`.
pub fn requested_sleep(query: Option<&str>) -> f64 {
    let raw = query.and_then(|q| first_query_value(q, "sleep"));

    let seconds = raw.as_deref().and_then(parse_leading_float).unwrap_or(0.0);
    if seconds.is_nan() {
        0.0
    } else {
        seconds.clamp(0.0, MAX_SLEEP_SECS)
    }
}

/// First value for `key` among the well-formed pairs of `query`.
///
/// Pairs containing `;` or a broken percent escape are skipped whole, so a
/// malformed leading pair does not hide a later valid one.
pub fn first_query_value(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty() && is_well_formed_pair(pair))
        .flat_map(|pair| url::form_urlencoded::parse(pair.as_bytes()))
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

fn is_well_formed_pair(pair: &str) -> bool {
    if pair.contains(';') {
        return false;
    }
    let bytes = pair.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Scan a float from the start of `input`, ignoring anything after it.
///
/// Leading whitespace is skipped. Accepts an optional sign, then either
/// decimal digits with an optional fraction and exponent, a hexadecimal
/// mantissa with a mandatory binary exponent (`0x1.8p1`), or
/// `inf`/`infinity`/`nan` in any case. Returns `None` when no number can be
/// read.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let unsigned = &s[end..];
    for word in ["infinity", "inf", "nan"] {
        if unsigned
            .get(..word.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(word))
        {
            return s[..end + word.len()].parse().ok();
        }
    }

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        return parse_hex_float(hex).map(|value| if negative { -value } else { value });
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !s[digits_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        end += 1;
        if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
            end += 1;
        }
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    s[..end].parse().ok()
}

/// Hexadecimal mantissa after the `0x` prefix, then `p` and a decimal
/// power of two.
fn parse_hex_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut mantissa = 0.0_f64;
    let mut fraction_digits: i32 = 0;
    let mut any_digit = false;

    while let Some(digit) = bytes.get(i).and_then(|b| (*b as char).to_digit(16)) {
        mantissa = mantissa * 16.0 + f64::from(digit);
        any_digit = true;
        i += 1;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while let Some(digit) = bytes.get(i).and_then(|b| (*b as char).to_digit(16)) {
            mantissa = mantissa * 16.0 + f64::from(digit);
            fraction_digits = fraction_digits.saturating_add(1);
            any_digit = true;
            i += 1;
        }
    }
    if !any_digit || !matches!(bytes.get(i), Some(b'p' | b'P')) {
        return None;
    }
    i += 1;

    let exponent_negative = bytes.get(i) == Some(&b'-');
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let mut exponent: i32 = 0;
    let mut any_exponent_digit = false;
    while let Some(digit) = bytes.get(i).and_then(|b| (*b as char).to_digit(10)) {
        exponent = exponent.saturating_mul(10).saturating_add(digit as i32);
        any_exponent_digit = true;
        i += 1;
    }
    if !any_exponent_digit {
        return None;
    }
    if exponent_negative {
        exponent = -exponent;
    }

    let scale = exponent.saturating_sub(fraction_digits.saturating_mul(4));
    Some(mantissa * 2.0_f64.powi(scale))
}
