//! Issuer and gate handlers, plus the no-cache middleware
//!
//! The gate validates in a fixed order and stops at the first failure:
//! presence, signature, expiry, referer, then source read and transform.
//! The cheap checks run before any disk or CPU work.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::error::AssetError;
use super::server::{AssetServerState, AVATAR_ROUTE};
use crate::token::{DimensionHints, IssuedToken, SignedToken, TokenQuery};
use crate::transform::{RenderedAvatar, OUTPUT_FILENAME};

const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

/// `Cache-Control` sent with every issuer and gate response
pub const NO_CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, private";

/// `Expires` value pinned to the epoch
pub const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Forbid caching of every response, success or failure.
///
/// A cached token would already be expired when reused; a cached image
/// would outlive its link; a cached error would stick.
pub async fn no_cache_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE_CONTROL));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static(EPOCH_EXPIRES));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    response
}

/// Mint a signed avatar link
///
/// Route: GET /api/avatar-url?w&h&q
///
/// The query is taken as raw pairs so repeated or unknown keys never
/// reject the request.
pub async fn issue_token(
    State(state): State<AssetServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<IssuedToken> {
    let hints = DimensionHints::from_pairs(&pairs);
    let now = state.clock.now_unix();
    let token = state.signer.issue(&hints, now);
    let descriptor = token.descriptor();

    tracing::debug!(
        exp = descriptor.exp,
        w = descriptor.dimensions.width,
        h = descriptor.dimensions.height,
        q = descriptor.dimensions.quality,
        "Issued avatar link"
    );

    Json(token.to_issued(AVATAR_ROUTE))
}

/// Validate a signed link and serve the transformed avatar
///
/// Route: GET /api/avatar?exp&w&h&q&sig
pub async fn serve_avatar(
    State(state): State<AssetServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AssetError> {
    // 1-2. presence, clamp and canonicalize
    let token = SignedToken::from_query(&TokenQuery::from_pairs(&pairs))?;

    // 3-4. signature, then expiry
    let descriptor = token.verify(&state.signer, state.clock.now_unix())?;

    // 5. referer
    check_referer(&headers, &uri)?;

    // 6-7. source read and transform
    let rendered = state.pipeline.render(descriptor.dimensions).await?;

    tracing::debug!(
        w = rendered.width,
        h = rendered.height,
        bytes = rendered.data.len(),
        "Served avatar"
    );

    Ok(avatar_response(rendered))
}

fn avatar_response(rendered: RenderedAvatar) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, rendered.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", OUTPUT_FILENAME),
            ),
            (CROSS_ORIGIN_RESOURCE_POLICY, "same-origin".to_string()),
        ],
        rendered.data,
    )
        .into_response()
}

/// Anti-hotlink check.
///
/// A request without `Referer` passes. With one, its host (and explicit
/// port) must equal the request host exactly. This is a deterrent only.
pub fn check_referer(headers: &HeaderMap, uri: &Uri) -> Result<(), AssetError> {
    let Some(referer) = headers.get(header::REFERER) else {
        return Ok(());
    };

    let referer = referer.to_str().unwrap_or("");
    let allowed = match (referer_host(referer), request_host(headers, uri)) {
        (Some(from), Some(host)) => from == host,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AssetError::HotlinkBlocked {
            referer: referer.to_string(),
        })
    }
}

/// Host of the request: the `Host` header, or the URI authority (HTTP/2)
fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .filter(|h| !h.is_empty())
}

/// `host[:port]` of an http(s) referer URL
fn referer_host(referer: &str) -> Option<String> {
    let uri: Uri = referer.parse().ok()?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => return None,
    }

    let authority = uri.authority()?;
    Some(match authority.port() {
        Some(port) => format!("{}:{}", authority.host(), port.as_str()),
        None => authority.host().to_string(),
    })
}
