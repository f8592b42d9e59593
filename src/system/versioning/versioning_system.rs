use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use std::sync::LazyLock;

use crate::system::config::VersioningConfig;

pub const INVALID_VERSION_MESSAGE: &str = "The API version you requested does not exist.";

// `/v<ascii digits>` followed by a non-empty continuation that starts with `/`
static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v([0-9]+)(/.+)$").expect("version segment pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    Path,    // explicit `/v<n>/` prefix
    Default, // highest supported version
}

/// Version resolved for a single request, stored in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: u32,
    pub source: VersionSource,
}

impl VersionInfo {
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_explicit(&self) -> bool {
        self.source == VersionSource::Path
    }

    /// Version as it appeared in the URI (`"v2"`), or an empty string when the
    /// request relied on the default version.
    pub fn uri(&self) -> String {
        if self.is_explicit() {
            format!("v{}", self.version)
        } else {
            String::new()
        }
    }
}

/// Outcome of a successful resolution. `path` borrows from the input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub info: VersionInfo,
    pub path: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("The API version you requested does not exist.")]
    InvalidVersion { requested: Option<u32> },
    #[error("API version was not resolved for this request")]
    NotResolved,
    #[error("Failed to rewrite request URI: {0}")]
    UriRewrite(String),
}

impl VersionError {
    pub fn status(&self) -> StatusCode {
        match self {
            VersionError::InvalidVersion { .. } => StatusCode::CONFLICT,
            VersionError::NotResolved | VersionError::UriRewrite(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            VersionError::InvalidVersion { .. } => "InvalidVersion",
            VersionError::NotResolved => "VersionNotResolved",
            VersionError::UriRewrite(_) => "VersionRewriteFailed",
        }
    }
}

impl IntoResponse for VersionError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));

        (self.status(), body).into_response()
    }
}

/// Supported API versions plus the response-header switch. Built once at
/// startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    supported_versions: Vec<u32>,
    emit_header: bool,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self {
            supported_versions: vec![1],
            emit_header: true,
        }
    }

    pub fn with_versions(versions: impl IntoIterator<Item = u32>) -> Self {
        let mut registry = Self::new();
        registry.set_versions(versions);
        registry
    }

    pub fn from_config(config: &VersioningConfig) -> Self {
        Self {
            supported_versions: config.supported_versions.clone(),
            emit_header: config.emit_header,
        }
    }

    pub fn set_versions(&mut self, versions: impl IntoIterator<Item = u32>) {
        self.supported_versions = versions.into_iter().collect();
    }

    pub fn set_emit_header(&mut self, emit: bool) {
        self.emit_header = emit;
    }

    pub fn supported_versions(&self) -> &[u32] {
        &self.supported_versions
    }

    /// Numerically highest supported version; `None` when nothing is configured.
    pub fn latest_version(&self) -> Option<u32> {
        self.supported_versions.iter().copied().max()
    }

    pub fn is_supported(&self, version: u32) -> bool {
        self.supported_versions.contains(&version)
    }

    pub fn emits_header(&self) -> bool {
        self.emit_header
    }

    /// Resolves the effective version for `path` and the path to route on.
    ///
    /// A leading `/v<digits>/<rest>` segment selects the version explicitly and
    /// is stripped, leaving `/<rest>`. Anything else falls back to the latest
    /// supported version and keeps the path untouched. Either way the version
    /// must be supported or the request is rejected.
    pub fn resolve<'a>(&self, path: &'a str) -> Result<Resolution<'a>, VersionError> {
        let (candidate, source, path) = match split_version_segment(path) {
            Some((digits, rest)) => (digits.parse::<u32>().ok(), VersionSource::Path, rest),
            None => (self.latest_version(), VersionSource::Default, path),
        };

        match candidate {
            Some(version) if self.is_supported(version) => Ok(Resolution {
                info: VersionInfo { version, source },
                path,
            }),
            requested => Err(VersionError::InvalidVersion { requested }),
        }
    }
}

impl Default for VersionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `/v12/users` into `("12", "/users")`.
///
/// Only ASCII digits count, and only the path is matched: `/v1/?page=2` has
/// path `/v1/`, which has no continuation and is not a version segment.
pub fn split_version_segment(path: &str) -> Option<(&str, &str)> {
    let captures = VERSION_SEGMENT.captures(path)?;
    let digits = captures.get(1)?.as_str();
    let rest = captures.get(2)?.as_str();
    Some((digits, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_version_segment() {
        assert_eq!(split_version_segment("/v1/users"), Some(("1", "/users")));
        assert_eq!(split_version_segment("/v10/a/b?x=1"), Some(("10", "/a/b?x=1")));
        assert_eq!(split_version_segment("/v2"), None);
        assert_eq!(split_version_segment("/v2/"), None);
        assert_eq!(split_version_segment("/vx/users"), None);
        assert_eq!(split_version_segment("/users/v1/x"), None);
        assert_eq!(split_version_segment("/version/x"), None);
    }

    #[test]
    fn test_explicit_version_is_stripped() {
        let registry = VersionRegistry::new();
        let resolution = registry.resolve("/v1/users").unwrap();

        assert_eq!(resolution.path, "/users");
        assert_eq!(resolution.info.version, 1);
        assert!(resolution.info.is_explicit());
        assert_eq!(resolution.info.uri(), "v1");
    }

    #[test]
    fn test_nested_rest_is_preserved() {
        let registry = VersionRegistry::with_versions([1, 2]);
        let resolution = registry.resolve("/v2/users/42/posts").unwrap();

        assert_eq!(resolution.path, "/users/42/posts");
        assert_eq!(resolution.info.version, 2);
    }

    #[test]
    fn test_unsupported_explicit_version_is_rejected() {
        let registry = VersionRegistry::with_versions([1, 2]);
        let err = registry.resolve("/v3/users").unwrap_err();

        assert!(matches!(err, VersionError::InvalidVersion { requested: Some(3) }));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "The API version you requested does not exist.");
    }

    #[test]
    fn test_default_is_latest_version() {
        let registry = VersionRegistry::with_versions([1, 2]);
        let resolution = registry.resolve("/users").unwrap();

        assert_eq!(resolution.path, "/users");
        assert_eq!(resolution.info.version, 2);
        assert!(!resolution.info.is_explicit());
        assert_eq!(resolution.info.uri(), "");
    }

    #[test]
    fn test_default_uses_numeric_max() {
        let registry = VersionRegistry::with_versions([2, 10]);
        assert_eq!(registry.latest_version(), Some(10));
        assert_eq!(registry.resolve("/users").unwrap().info.version, 10);
    }

    #[test]
    fn test_resolving_rewritten_path_is_stable() {
        let registry = VersionRegistry::with_versions([1, 2]);
        let first = registry.resolve("/v1/users").unwrap();
        assert_eq!(first.path, "/users");

        let second = registry.resolve(first.path).unwrap();
        assert_eq!(second.path, "/users");
        assert_eq!(second.info.version, 2);
        assert_eq!(second.info.source, VersionSource::Default);

        let third = registry.resolve(second.path).unwrap();
        assert_eq!(third, second);
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_version() {
        let registry = VersionRegistry::with_versions([1, 2]);
        assert_eq!(split_version_segment("/v\u{0662}/users"), None);
        assert_eq!(split_version_segment("/v\u{FF12}/users"), None);

        let resolution = registry.resolve("/v\u{0662}/users").unwrap();
        assert_eq!(resolution.path, "/v\u{0662}/users");
        assert_eq!(resolution.info.version, 2);
        assert_eq!(resolution.info.source, VersionSource::Default);
    }

    #[test]
    fn test_leading_zeros() {
        let registry = VersionRegistry::new();
        let resolution = registry.resolve("/v01/users").unwrap();

        assert_eq!(resolution.info.version, 1);
        assert_eq!(resolution.path, "/users");
    }

    #[test]
    fn test_overflowing_version_is_rejected() {
        let registry = VersionRegistry::new();
        let err = registry.resolve("/v99999999999999999999/users").unwrap_err();

        assert!(matches!(err, VersionError::InvalidVersion { requested: None }));
    }

    #[test]
    fn test_bare_version_falls_back_to_default() {
        let registry = VersionRegistry::with_versions([1, 2]);
        let resolution = registry.resolve("/v1").unwrap();

        assert_eq!(resolution.path, "/v1");
        assert_eq!(resolution.info.version, 2);
        assert_eq!(resolution.info.source, VersionSource::Default);
    }

    #[test]
    fn test_empty_registry_rejects_everything() {
        let registry = VersionRegistry::with_versions(Vec::new());

        assert_eq!(registry.latest_version(), None);
        assert!(registry.resolve("/users").is_err());
        assert!(registry.resolve("/v1/users").is_err());
    }

    #[test]
    fn test_duplicate_versions() {
        let registry = VersionRegistry::with_versions([2, 1, 2]);

        assert_eq!(registry.latest_version(), Some(2));
        assert!(registry.resolve("/v1/x").is_ok());
        assert!(registry.resolve("/v3/x").is_err());
    }

    #[test]
    fn test_registry_from_config() {
        let config = VersioningConfig {
            supported_versions: vec![3, 4],
            emit_header: false,
        };
        let registry = VersionRegistry::from_config(&config);

        assert_eq!(registry.supported_versions(), &[3, 4]);
        assert!(!registry.emits_header());
    }
}
