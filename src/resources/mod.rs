//! Uniform CRUD access to the console's REST collections.

pub mod extras;
pub mod updater;
pub mod users;

use serde_json::Value;

use crate::client::normalize::to_items;
use crate::client::{path_segment, ApiClient, QueryParams, RequestDescriptor};
use crate::error::ApiResult;

pub use extras::{DealsApi, DocumentsApi, ForecastsApi, StatsApi};
pub use updater::update_with_fallback;
pub use users::UsersApi;

/// Immutable resource name to base path mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    pub name: &'static str,
    pub base_path: String,
}

impl ResourceConfig {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            base_path: format!("/{}", name),
        }
    }

    pub fn with_base_path(name: &'static str, base_path: impl Into<String>) -> Self {
        Self {
            name,
            base_path: base_path.into(),
        }
    }

    pub fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.base_path, path_segment(id))
    }
}

/// Resources the console manages through the standard five operations.
pub const CRUD_RESOURCES: &[&str] = &[
    "leads",
    "contacts",
    "deals",
    "tasks",
    "meetings",
    "calls",
    "products",
    "quotes",
    "salesorders",
    "invoices",
    "campaigns",
    "documents",
];

pub fn catalog() -> Vec<ResourceConfig> {
    CRUD_RESOURCES.iter().copied().map(ResourceConfig::new).collect()
}

pub fn lookup(name: &str) -> Option<ResourceConfig> {
    CRUD_RESOURCES
        .iter()
        .copied()
        .find(|r| r.eq_ignore_ascii_case(name))
        .map(ResourceConfig::new)
}

#[derive(Clone)]
pub struct ResourceApi {
    client: ApiClient,
    config: ResourceConfig,
}

impl ResourceApi {
    pub fn new(client: ApiClient, config: ResourceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Collection payload as it came out of the response normalizer.
    pub async fn list_raw(&self, query: QueryParams) -> ApiResult<Value> {
        self.client.get_json(&self.config.base_path, query).await
    }

    pub async fn list(&self, query: QueryParams) -> ApiResult<Vec<Value>> {
        let payload = self.list_raw(query).await?;
        if !payload.is_array() {
            tracing::debug!(
                "{} list payload is not a sequence, reading items",
                self.config.name
            );
        }
        Ok(to_items(payload))
    }

    pub async fn get(&self, id: &str) -> ApiResult<Value> {
        self.client
            .get_json(&self.config.record_path(id), QueryParams::new())
            .await
    }

    pub async fn create(&self, body: Value) -> ApiResult<Value> {
        self.client.post_json(&self.config.base_path, body).await
    }

    pub async fn update(&self, id: &str, body: Value) -> ApiResult<Value> {
        update_with_fallback(&self.client, &self.config.base_path, id, body).await
    }

    pub async fn remove(&self, id: &str) -> ApiResult<Value> {
        self.client
            .send_json(RequestDescriptor::delete(self.config.record_path(id)))
            .await
    }
}

/// Entry point bundling every resource helper over one client.
#[derive(Clone)]
pub struct Console {
    client: ApiClient,
}

impl Console {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn resource(&self, config: ResourceConfig) -> ResourceApi {
        ResourceApi::new(self.client.clone(), config)
    }

    pub fn leads(&self) -> ResourceApi {
        self.resource(ResourceConfig::new("leads"))
    }

    pub fn contacts(&self) -> ResourceApi {
        self.resource(ResourceConfig::new("contacts"))
    }

    pub fn tasks(&self) -> ResourceApi {
        self.resource(ResourceConfig::new("tasks"))
    }

    pub fn invoices(&self) -> ResourceApi {
        self.resource(ResourceConfig::new("invoices"))
    }

    pub fn campaigns(&self) -> ResourceApi {
        self.resource(ResourceConfig::new("campaigns"))
    }

    pub fn deals(&self) -> DealsApi {
        DealsApi::new(self.client.clone())
    }

    pub fn documents(&self) -> DocumentsApi {
        DocumentsApi::new(self.client.clone())
    }

    pub fn forecasts(&self) -> ForecastsApi {
        ForecastsApi::new(self.client.clone())
    }

    pub fn stats(&self) -> StatsApi {
        StatsApi::new(self.client.clone())
    }

    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.client.clone())
    }
}
