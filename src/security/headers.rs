//! Header manipulation for proxied traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Rewrite `Host` to the upstream authority
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//!
//! # Design Decisions
//! - Client IP is appended to any existing X-Forwarded-For chain
//! - End-to-end headers (Authorization, Cookie, Content-Type...) pass untouched

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Headers meaningful only for a single transport hop (RFC 9110 §7.6.1).
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Turn the client's request headers into the headers sent upstream.
pub fn prepare_upstream_headers(
    headers: &mut HeaderMap,
    client: SocketAddr,
    upstream_authority: &HeaderValue,
    add_forwarded: bool,
) {
    strip_hop_by_hop(headers);

    let original_host = headers.insert(header::HOST, upstream_authority.clone());

    if !add_forwarded {
        return;
    }

    let client_ip = client.ip().to_string();
    let chain = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) if !existing.trim().is_empty() => format!("{}, {}", existing, client_ip),
        _ => client_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&chain) {
        headers.insert(X_FORWARDED_FOR, value);
    }

    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host);
    }
}
