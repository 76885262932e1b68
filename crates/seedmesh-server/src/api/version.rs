//! Version Endpoint

use crate::version::VersionInfo;
use axum::response::Json;

/// GET /version
pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}
