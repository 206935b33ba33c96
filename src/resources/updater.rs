use serde_json::Value;

use crate::client::{path_segment, ApiClient, RequestDescriptor};
use crate::error::ApiResult;

/// `PATCH {base}/{id}`, retried once as `PUT` when the partial-update route
/// is not mounted (404/405).
///
/// Any other failure, and any failure of the `PUT` itself, reaches the
/// caller unchanged.
pub async fn update_with_fallback(
    client: &ApiClient,
    base_path: &str,
    id: &str,
    body: Value,
) -> ApiResult<Value> {
    let path = format!("{}/{}", base_path, path_segment(id));
    match client
        .send_json(RequestDescriptor::patch(&path).json(body.clone()))
        .await
    {
        Ok(updated) => Ok(updated),
        Err(e) if e.is_route_mismatch() => {
            tracing::debug!(
                "PATCH {} unavailable ({:?}), retrying as PUT",
                path,
                e.status()
            );
            client.send_json(RequestDescriptor::put(&path).json(body)).await
        }
        Err(e) => Err(e),
    }
}
