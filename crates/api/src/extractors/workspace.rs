use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use bson::oid::ObjectId;

use crate::error::ApiError;

/// Extracts workspace_id from the URL path parameter `:workspace_id`
#[derive(Debug, Clone)]
pub struct WorkspaceId(pub ObjectId);

impl<S> FromRequestParts<S> for WorkspaceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params): Path<std::collections::HashMap<String, String>> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::BadRequest("Missing path parameters".to_string()))?;

        let wid_str = params
            .get("workspace_id")
            .ok_or_else(|| ApiError::BadRequest("Missing workspace_id parameter".to_string()))?;

        let workspace_id = ObjectId::parse_str(wid_str)
            .map_err(|_| ApiError::BadRequest("Invalid workspace_id format".to_string()))?;

        Ok(WorkspaceId(workspace_id))
    }
}
