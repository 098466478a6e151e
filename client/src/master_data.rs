//! Local copy of the farm's master data
//!
//! Kept under a fixed key until invalidated by hand, e.g. after the user
//! edits a field or warehouse.

use reqwest::Method;
use shared::MasterData;

use crate::client::FarmClient;
use crate::error::ClientResult;

pub const MASTER_DATA_CACHE_KEY: &str = "farm.master_data.v1";

impl FarmClient {
    /// Cached master data, fetched on first use
    pub async fn master_data(&self) -> ClientResult<MasterData> {
        if let Some(value) = self.cache.read().await.get(MASTER_DATA_CACHE_KEY) {
            match serde_json::from_value::<MasterData>(value.clone()) {
                Ok(data) => return Ok(data),
                Err(e) => tracing::warn!(error = %e, "discarding unreadable master data cache"),
            }
        }
        self.fetch_master_data(Method::GET, "/master-data").await
    }

    /// Ask the server to reload its copy too, then replace the local one
    pub async fn refresh_master_data(&self) -> ClientResult<MasterData> {
        self.fetch_master_data(Method::POST, "/master-data/refresh").await
    }

    pub async fn invalidate_master_data(&self) {
        self.cache.write().await.remove(MASTER_DATA_CACHE_KEY);
    }

    async fn fetch_master_data(&self, method: Method, path: &str) -> ClientResult<MasterData> {
        let request = self.request(method, path).await?;
        let data: MasterData = self.send(request).await?;

        if let Ok(value) = serde_json::to_value(&data) {
            self.cache
                .write()
                .await
                .insert(MASTER_DATA_CACHE_KEY.to_string(), value);
        }
        Ok(data)
    }
}
