//! URI-path API versioning: `/v<n>/...` resolution, the axum middleware that
//! applies it, and the extractors handlers use to read the result.

pub mod extractor;
pub mod middleware;
pub mod versioning_system;

pub use extractor::{extract_version_info_from_request, Version, VersionAware, VersionedResponse};
pub use middleware::{rewrite_path, version_middleware, API_VERSION_HEADER};
pub use versioning_system::{
    split_version_segment, Resolution, VersionError, VersionInfo, VersionRegistry, VersionSource,
    INVALID_VERSION_MESSAGE,
};
