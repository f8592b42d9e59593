use axum::{
    extract::{OriginalUri, Request, State},
    http::{header::HeaderName, uri::PathAndQuery, HeaderValue, Uri},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{VersionError, VersionRegistry};

pub const API_VERSION_HEADER: HeaderName = HeaderName::from_static("api-version");

/// Resolves the API version from the request path before the router sees it.
///
/// On success the `/v<n>` segment is stripped from the URI, the resolved
/// [`VersionInfo`](super::VersionInfo) is stored in the request extensions and,
/// unless disabled, the response carries an `API-Version` header. Unsupported
/// versions short-circuit with a 409 and the inner service is never called.
///
/// Routing happens on the rewritten path only when this wraps the whole
/// `Router` (see `app::with_versioning`); `Router::layer` runs after routing.
pub async fn version_middleware(
    State(registry): State<Arc<VersionRegistry>>,
    mut request: Request,
    next: Next,
) -> Result<Response, VersionError> {
    let original = request.uri().clone();

    let resolution = match registry.resolve(original.path()) {
        Ok(resolution) => resolution,
        Err(err) => {
            warn!(path = original.path(), error = ?err, "rejecting unsupported API version");
            return Err(err);
        }
    };
    let info = resolution.info;

    if resolution.path != original.path() {
        let rewritten = rewrite_path(&original, resolution.path)?;
        if request.extensions().get::<OriginalUri>().is_none() {
            request.extensions_mut().insert(OriginalUri(original.clone()));
        }
        *request.uri_mut() = rewritten;
    }

    debug!(
        version = info.version,
        explicit = info.is_explicit(),
        path = request.uri().path(),
        "resolved API version"
    );
    request.extensions_mut().insert(info);

    let mut response = next.run(request).await;

    if registry.emits_header() {
        response
            .headers_mut()
            .insert(API_VERSION_HEADER, HeaderValue::from(info.version));
    }

    Ok(response)
}

/// Replaces the path of `uri`, keeping scheme, authority and query.
pub fn rewrite_path(uri: &Uri, path: &str) -> Result<Uri, VersionError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| VersionError::UriRewrite(e.to_string()))?,
    );

    Uri::from_parts(parts).map_err(|e| VersionError::UriRewrite(e.to_string()))
}
