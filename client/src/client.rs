//! HTTP request layer
//!
//! Every call carries the anon key as `apikey` and, once signed in, the
//! session token as a bearer. Error bodies are decoded into
//! `ClientError::Api` so callers can classify them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{Bin, BinLotStock, CreateBinInput, CreateSaleInput, ErrorResponse, Profile, Sale};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::tables::{Operation, Table};

#[derive(Clone)]
pub struct FarmClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<RwLock<Option<Session>>>,
    /// Local key-value cache, see `master_data`
    pub(crate) cache: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl FarmClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            session: Arc::new(RwLock::new(None)),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub async fn set_session(&self, session: Session) {
        tracing::debug!(user_id = ?session.user_id, "session set");
        *self.session.write().await = Some(session);
    }

    /// Sign out: drops the session and everything cached for it
    pub async fn clear_session(&self) {
        *self.session.write().await = None;
        self.cache.write().await.clear();
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn bearer(&self) -> ClientResult<String> {
        let session = self.session.read().await;
        match session.as_ref() {
            Some(s) if !s.is_expired_at(Utc::now()) => Ok(s.access_token.clone()),
            _ => Err(ClientError::MissingSession),
        }
    }

    // ------------------------------------------------------------------
    // Generic table access
    // ------------------------------------------------------------------

    /// List rows; `filters` become query parameters (`season_id`, `lot_id`, `page`...)
    pub async fn select<T: DeserializeOwned>(&self, table: Table, filters: &[(&str, String)]) -> ClientResult<Vec<T>> {
        let path = table.path(Operation::Select, None)?;
        let request = self.request(Method::GET, &path).await?.query(filters);
        self.send(request).await
    }

    pub async fn single<T: DeserializeOwned>(&self, table: Table, id: Uuid) -> ClientResult<T> {
        let path = table.path(Operation::Single, Some(id))?;
        let request = self.request(Method::GET, &path).await?;
        self.send(request).await
    }

    pub async fn insert<B, T>(&self, table: Table, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = table.path(Operation::Insert, None)?;
        let request = self.request(Method::POST, &path).await?.json(body);
        self.send(request).await
    }

    pub async fn update<B, T>(&self, table: Table, id: Uuid, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = table.path(Operation::Update, Some(id))?;
        let request = self.request(Method::PUT, &path).await?.json(body);
        self.send(request).await
    }

    pub async fn delete(&self, table: Table, id: Uuid) -> ClientResult<()> {
        let path = table.path(Operation::Delete, Some(id))?;
        let request = self.request(Method::DELETE, &path).await?;
        self.send_empty(request).await
    }

    /// Call a server-side procedure by name
    pub async fn rpc<B, T>(&self, name: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, &format!("/rpc/{}", name))
            .await?
            .json(body);
        self.send(request).await
    }

    // ------------------------------------------------------------------
    // Typed helpers
    // ------------------------------------------------------------------

    /// Sale and its SALE_OUT movement in one server transaction
    pub async fn create_sale_atomic(&self, input: &CreateSaleInput) -> ClientResult<Sale> {
        let sale: Sale = self.rpc("create_sale_atomic", input).await?;
        tracing::info!(sale_id = %sale.id, lot_id = %sale.lot_id, total_gel = %sale.total_gel, "sale created");
        Ok(sale)
    }

    pub async fn create_bin(&self, warehouse_id: Uuid, input: &CreateBinInput) -> ClientResult<Bin> {
        let request = self
            .request(Method::POST, &format!("/warehouses/{}/bins", warehouse_id))
            .await?
            .json(input);
        self.send(request).await
    }

    pub async fn my_profile(&self) -> ClientResult<Profile> {
        let request = self.request(Method::GET, "/profiles/me").await?;
        self.send(request).await
    }

    pub async fn stock(&self) -> ClientResult<Vec<BinLotStock>> {
        self.select(Table::BinLotStock, &[]).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    pub(crate) async fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.bearer().await?;
        let url = format!("{}{}", self.config.api_base(), path);
        tracing::debug!(%method, %url, "request");

        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(token))
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

/// Decode an error response, falling back to the raw body text
async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => (Some(parsed.error.code), parsed.error.message_en),
        Err(_) if body.is_empty() => (None, status.canonical_reason().unwrap_or("error").to_string()),
        Err(_) => (None, body),
    };

    if status == StatusCode::UNAUTHORIZED || status.is_server_error() {
        tracing::warn!(status = status.as_u16(), ?code, %message, "request failed");
    } else {
        tracing::debug!(status = status.as_u16(), ?code, %message, "request rejected");
    }

    ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
