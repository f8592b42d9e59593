use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};

use super::{VersionError, VersionInfo, VersionSource};

// Helper function to extract VersionInfo from request
pub fn extract_version_info_from_request(request: &Request) -> Option<VersionInfo> {
    request.extensions().get::<VersionInfo>().copied()
}

/// Extractor for the version resolved by `version_middleware`.
///
/// Rejects with [`VersionError::NotResolved`] when the middleware did not run
/// for this request.
#[derive(Debug, Clone, Copy)]
pub struct Version(pub VersionInfo);

impl std::ops::Deref for Version {
    type Target = VersionInfo;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<VersionInfo> for Version {
    fn from(version_info: VersionInfo) -> Self {
        Version(version_info)
    }
}

impl<S> FromRequestParts<S> for Version
where
    S: Send + Sync,
{
    type Rejection = VersionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VersionInfo>()
            .copied()
            .map(Version::from)
            .ok_or(VersionError::NotResolved)
    }
}

// Helper trait for version-aware handlers
pub trait VersionAware {
    fn version(&self) -> u32;
    fn source(&self) -> VersionSource;
    fn is_explicit(&self) -> bool {
        self.source() == VersionSource::Path
    }
    fn is_version(&self, version: u32) -> bool {
        self.version() == version
    }
    fn is_at_least_version(&self, version: u32) -> bool {
        self.version() >= version
    }
}

impl VersionAware for VersionInfo {
    fn version(&self) -> u32 {
        self.version
    }

    fn source(&self) -> VersionSource {
        self.source
    }
}

impl VersionAware for Version {
    fn version(&self) -> u32 {
        self.0.version
    }

    fn source(&self) -> VersionSource {
        self.0.source
    }
}

// Response helper that includes version info
#[derive(serde::Serialize)]
pub struct VersionedResponse<T: serde::Serialize> {
    pub data: T,
    pub version: u32,
    pub source: String,
    pub uri: String,
}

impl<T: serde::Serialize> VersionedResponse<T> {
    pub fn new(data: T, version_info: &VersionInfo) -> Self {
        Self {
            data,
            version: version_info.version,
            source: match version_info.source {
                VersionSource::Path => "path".to_string(),
                VersionSource::Default => "default".to_string(),
            },
            uri: version_info.uri(),
        }
    }
}

impl<T: serde::Serialize> IntoResponse for VersionedResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
