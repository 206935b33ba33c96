// Resource-specific endpoints beyond the five standard operations
use serde_json::Value;

use crate::client::{path_segment, ApiClient, QueryParams, RequestDescriptor};
use crate::error::{ApiError, ApiResult};
use crate::resources::{ResourceApi, ResourceConfig};

#[derive(Clone)]
pub struct DealsApi {
    client: ApiClient,
    records: ResourceApi,
}

impl DealsApi {
    pub fn new(client: ApiClient) -> Self {
        let records = ResourceApi::new(client.clone(), ResourceConfig::new("deals"));
        Self { client, records }
    }

    pub fn records(&self) -> &ResourceApi {
        &self.records
    }

    /// Pipeline stage definitions (`GET /deals/stages`).
    pub async fn stages(&self) -> ApiResult<Value> {
        self.client.get_json("/deals/stages", QueryParams::new()).await
    }

    /// Board view: `GET /deals?view=kanban` plus caller filters.
    pub async fn by_kanban(&self, filters: QueryParams) -> ApiResult<Value> {
        let mut query = QueryParams::new().with("view", "kanban");
        query.extend(filters);
        self.client.get_json("/deals", query).await
    }
}

#[derive(Clone)]
pub struct DocumentsApi {
    client: ApiClient,
    records: ResourceApi,
}

impl DocumentsApi {
    pub fn new(client: ApiClient) -> Self {
        let records = ResourceApi::new(client.clone(), ResourceConfig::new("documents"));
        Self { client, records }
    }

    pub fn records(&self) -> &ResourceApi {
        &self.records
    }

    /// Multipart upload under the `file` field.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<Value> {
        if file_name.trim().is_empty() {
            return Err(ApiError::validation("File name is required", Some("file")));
        }
        self.client
            .send_json(RequestDescriptor::post("/documents").multipart("file", file_name, bytes))
            .await
    }

    pub async fn download(&self, id: &str) -> ApiResult<Vec<u8>> {
        self.client
            .get_bytes(&format!("/documents/{}/download", path_segment(id)))
            .await
    }
}

#[derive(Clone)]
pub struct ForecastsApi {
    client: ApiClient,
}

impl ForecastsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self) -> ApiResult<Value> {
        self.client
            .get_json("/forecasts/summary", QueryParams::new())
            .await
    }
}

/// Aggregate dashboards; payloads are reports, never list envelopes.
#[derive(Clone)]
pub struct StatsApi {
    client: ApiClient,
}

impl StatsApi {
    pub const SUBJECTS: &'static [&'static str] = &["leads", "deals", "activities"];

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn leads(&self) -> ApiResult<Value> {
        self.subject("leads").await
    }

    pub async fn deals(&self) -> ApiResult<Value> {
        self.subject("deals").await
    }

    pub async fn activities(&self) -> ApiResult<Value> {
        self.subject("activities").await
    }

    /// `GET /{subject}/stats` for one of [`Self::SUBJECTS`].
    pub async fn subject(&self, subject: &str) -> ApiResult<Value> {
        if !Self::SUBJECTS.contains(&subject) {
            return Err(ApiError::validation(
                format!("Unknown stats subject '{}'", subject),
                Some("subject"),
            ));
        }
        self.client
            .get_json(&format!("/{}/stats", subject), QueryParams::new())
            .await
    }
}
