//! Caller identity extraction.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Identity used when nothing distinguishes the caller.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Derives the rate-limit identity for a request.
///
/// Proxy headers are only honored when `trust_proxy` is set: `X-Real-IP`
/// first, then the first non-empty `X-Forwarded-For` hop, then the peer
/// address.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = || {
        let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

        header("x-real-ip")
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .or_else(|| {
                header("x-forwarded-for")
                    .and_then(|list| list.split(',').map(str::trim).find(|ip| !ip.is_empty()))
            })
            .map(str::to_string)
    };

    trust_proxy
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}
