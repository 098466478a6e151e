//! Master data for form dropdowns, cached per farm
//!
//! Entries expire after the configured TTL and are dropped whenever a
//! field or warehouse of the farm is written.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::{Crop, Field, MasterData, Season, Warehouse, WorkType};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppResult;

pub struct MasterDataCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<Uuid, (Instant, Arc<MasterData>)>,
    /// Bumped by every invalidation of the farm
    generations: HashMap<Uuid, u64>,
}

impl MasterDataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Cached data for the farm, if still fresh
    pub async fn get(&self, farm_id: Uuid) -> Option<Arc<MasterData>> {
        let state = self.state.read().await;
        state
            .entries
            .get(&farm_id)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, data)| Arc::clone(data))
    }

    /// Read before loading; hand it back to [`put_if_current`](Self::put_if_current)
    pub async fn generation(&self, farm_id: Uuid) -> u64 {
        self.state
            .read()
            .await
            .generations
            .get(&farm_id)
            .copied()
            .unwrap_or(0)
    }

    /// Cache `data` unless the farm was invalidated since `generation` was read
    pub async fn put_if_current(&self, farm_id: Uuid, generation: u64, data: MasterData) -> Arc<MasterData> {
        let data = Arc::new(data);
        let mut state = self.state.write().await;
        let current = state.generations.get(&farm_id).copied().unwrap_or(0);
        if current == generation {
            state.entries.insert(farm_id, (Instant::now(), Arc::clone(&data)));
        } else {
            tracing::debug!(%farm_id, generation, current, "stale master data not cached");
        }
        data
    }

    pub async fn invalidate(&self, farm_id: Uuid) {
        let mut state = self.state.write().await;
        *state.generations.entry(farm_id).or_insert(0) += 1;
        if state.entries.remove(&farm_id).is_some() {
            tracing::debug!(%farm_id, "master data cache invalidated");
        }
    }
}

#[derive(Clone)]
pub struct MasterDataService {
    db: PgPool,
    cache: Arc<MasterDataCache>,
}

impl MasterDataService {
    pub fn new(db: PgPool, cache: Arc<MasterDataCache>) -> Self {
        Self { db, cache }
    }

    /// Served from the cache when fresh, loaded otherwise
    pub async fn get(&self, farm_id: Uuid) -> AppResult<Arc<MasterData>> {
        if let Some(data) = self.cache.get(farm_id).await {
            return Ok(data);
        }
        self.refresh(farm_id).await
    }

    /// Reload from the database and replace the cached entry
    pub async fn refresh(&self, farm_id: Uuid) -> AppResult<Arc<MasterData>> {
        let generation = self.cache.generation(farm_id).await;
        let data = self.load(farm_id).await?;
        tracing::debug!(
            %farm_id,
            seasons = data.seasons.len(),
            fields = data.fields.len(),
            warehouses = data.warehouses.len(),
            "master data loaded"
        );
        Ok(self.cache.put_if_current(farm_id, generation, data).await)
    }

    async fn load(&self, farm_id: Uuid) -> AppResult<MasterData> {
        let seasons = sqlx::query_as::<_, Season>(
            r#"
            SELECT id, farm_id, name, start_date, end_date, is_active, created_at
            FROM seasons WHERE farm_id = $1 ORDER BY start_date DESC
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        let crops = sqlx::query_as::<_, Crop>(
            "SELECT id, farm_id, name, created_at FROM crops WHERE farm_id = $1 ORDER BY name",
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        let fields = sqlx::query_as::<_, Field>(
            r#"
            SELECT id, farm_id, name, area_ha, location, crop_id, notes, created_at, updated_at
            FROM fields WHERE farm_id = $1 ORDER BY name
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        let warehouses = sqlx::query_as::<_, Warehouse>(
            "SELECT id, farm_id, name, location, created_at, updated_at FROM warehouses WHERE farm_id = $1 ORDER BY name",
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        let work_types = sqlx::query_as::<_, WorkType>(
            "SELECT id, farm_id, name, created_at FROM work_types WHERE farm_id = $1 ORDER BY name",
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(MasterData {
            seasons,
            crops,
            fields,
            warehouses,
            work_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_entries_are_served() {
        let cache = MasterDataCache::new(Duration::from_secs(300));
        let farm_id = Uuid::new_v4();
        assert!(cache.get(farm_id).await.is_none());

        cache.put_if_current(farm_id, 0, MasterData::default()).await;
        assert!(cache.get(farm_id).await.is_some());
        assert!(cache.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let cache = MasterDataCache::new(Duration::ZERO);
        let farm_id = Uuid::new_v4();
        cache.put_if_current(farm_id, 0, MasterData::default()).await;
        assert!(cache.get(farm_id).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_drops_only_that_farm() {
        let cache = MasterDataCache::new(Duration::from_secs(300));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        cache.put_if_current(a, 0, MasterData::default()).await;
        cache.put_if_current(b, 0, MasterData::default()).await;

        cache.invalidate(a).await;
        assert!(cache.get(a).await.is_none());
        assert!(cache.get(b).await.is_some());
    }

    #[tokio::test]
    async fn load_overtaken_by_a_write_is_not_cached() {
        let cache = MasterDataCache::new(Duration::from_secs(300));
        let farm_id = Uuid::new_v4();

        // a refresh reads the generation, then a field is written mid-load
        let generation = cache.generation(farm_id).await;
        cache.invalidate(farm_id).await;
        let stale = cache.put_if_current(farm_id, generation, MasterData::default()).await;

        assert!(stale.fields.is_empty());
        assert!(cache.get(farm_id).await.is_none());

        let generation = cache.generation(farm_id).await;
        assert_eq!(generation, 1);
        cache.put_if_current(farm_id, generation, MasterData::default()).await;
        assert!(cache.get(farm_id).await.is_some());
    }
}
