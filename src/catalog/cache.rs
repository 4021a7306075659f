//! 游戏数据缓存管理
//!
//! 读取顺序：内存 → 持久化缓存 → 数据源。数据源失败时回退到任意可解析的持久化条目（即使已过期）。
//!
//! 所有会修改缓存的操作都在 `fetch_gate` 内串行执行；在等待期间有其他调用方完成了拉取时，
//! 直接复用那次拉取的结果，不再重复请求数据源。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::normalize::normalize_rows;
use crate::catalog::source::RowSource;
use crate::catalog::store::CacheStore;
use crate::config::{DEFAULT_CACHE_KEY, DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::database::dto::StoredEntry;
use crate::entity::prelude::GameRecord;
use crate::error::CatalogError;
use crate::utils::clock::{Clock, SystemClock};

/// 缓存选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    pub cache_key: String,
    pub ttl: Duration,
    /// 超过该字节数的数据只保留在内存中，不写入持久化缓存
    pub max_payload_bytes: usize,
    /// 每次加载后打乱记录顺序
    pub shuffle_on_load: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            shuffle_on_load: false,
        }
    }
}

/// 加载状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// 缓存状态快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub load_state: LoadState,
    pub total: usize,
    pub is_loaded: bool,
    /// 当前数据的拉取时间距今的分钟数
    pub cache_age_minutes: Option<i64>,
}

struct CatalogState {
    records: Option<Arc<[GameRecord]>>,
    fetched_at: i64,
    load_state: LoadState,
}

type Outcome = Result<Arc<[GameRecord]>, CatalogError>;

#[derive(Default)]
struct FetchSlot {
    /// 最近一次在闸门内完成的结果
    last: Option<Outcome>,
    /// `last` 是否来自一次数据源请求（而不是缓存命中）
    from_source: bool,
}

pub struct GameCatalog<S, C> {
    source: S,
    store: C,
    clock: Arc<dyn Clock>,
    options: CacheOptions,
    state: RwLock<CatalogState>,
    fetch_gate: tokio::sync::Mutex<FetchSlot>,
    completed: AtomicU64,
}

impl<S: RowSource, C: CacheStore> GameCatalog<S, C> {
    pub fn new(source: S, store: C, options: CacheOptions) -> Self {
        Self {
            source,
            store,
            clock: Arc::new(SystemClock),
            options,
            state: RwLock::new(CatalogState {
                records: None,
                fetched_at: 0,
                load_state: LoadState::Idle,
            }),
            fetch_gate: tokio::sync::Mutex::new(FetchSlot::default()),
            completed: AtomicU64::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// 获取游戏记录
    ///
    /// `force_refresh` 为 true 时跳过内存和持久化缓存，直接请求数据源。
    pub async fn fetch_records(&self, force_refresh: bool) -> Result<Arc<[GameRecord]>, CatalogError> {
        let ticket = self.completed.load(Ordering::Acquire);

        if !force_refresh {
            if let Some(records) = self.fresh_in_memory(self.clock.now_millis()) {
                return Ok(records);
            }
        }

        let mut slot = self.fetch_gate.lock().await;

        // 强制刷新只复用真正请求过数据源的结果
        if self.completed.load(Ordering::Acquire) != ticket && (!force_refresh || slot.from_source) {
            if let Some(outcome) = &slot.last {
                log::debug!("等待期间已有拉取完成，复用其结果");
                return outcome.clone();
            }
        }

        let (outcome, from_source) = self.load_locked(force_refresh).await;
        slot.last = Some(outcome.clone());
        slot.from_source = from_source;
        self.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    /// 清除内存和持久化缓存，下一次获取必然请求数据源
    pub async fn clear_cache(&self) -> Result<(), CatalogError> {
        let mut slot = self.fetch_gate.lock().await;
        slot.last = None;
        slot.from_source = false;
        {
            let mut state = self.state.write();
            state.records = None;
            state.fetched_at = 0;
            state.load_state = LoadState::Idle;
        }
        self.store.remove(&self.options.cache_key).await?;
        log::info!("已清除游戏数据缓存: {}", self.options.cache_key);
        Ok(())
    }

    /// 当前内存中的记录（不触发加载）
    pub fn records(&self) -> Option<Arc<[GameRecord]>> {
        self.state.read().records.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.state.read().load_state.clone()
    }

    pub fn status(&self) -> CatalogStatus {
        let now = self.clock.now_millis();
        let state = self.state.read();
        let total = state.records.as_ref().map_or(0, |records| records.len());
        CatalogStatus {
            load_state: state.load_state.clone(),
            total,
            is_loaded: state.records.is_some(),
            cache_age_minutes: state
                .records
                .as_ref()
                .map(|_| (now - state.fetched_at).max(0) / 60_000),
        }
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.options.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// 恰好等于有效期时仍然有效
    fn is_fresh(&self, fetched_at: i64, now: i64) -> bool {
        now.saturating_sub(fetched_at) <= self.ttl_millis()
    }

    fn fresh_in_memory(&self, now: i64) -> Option<Arc<[GameRecord]>> {
        let state = self.state.read();
        match &state.records {
            Some(records) if self.is_fresh(state.fetched_at, now) => Some(records.clone()),
            _ => None,
        }
    }

    fn set_load_state(&self, load_state: LoadState) {
        self.state.write().load_state = load_state;
    }

    fn adopt(&self, records: Vec<GameRecord>, fetched_at: i64) -> Arc<[GameRecord]> {
        let records: Arc<[GameRecord]> = records.into();
        let mut state = self.state.write();
        state.records = Some(records.clone());
        state.fetched_at = fetched_at;
        state.load_state = LoadState::Ready;
        records
    }

    /// 返回结果以及是否请求了数据源
    async fn load_locked(&self, force_refresh: bool) -> (Outcome, bool) {
        let now = self.clock.now_millis();
        let mut stale = None;

        if !force_refresh {
            if let Some(records) = self.fresh_in_memory(now) {
                return (Ok(records), false);
            }
            if let Some((records, fetched_at)) = self.read_persisted().await {
                if self.is_fresh(fetched_at, now) {
                    log::debug!("使用持久化缓存，共 {} 条记录", records.len());
                    return (Ok(self.adopt(records, fetched_at)), false);
                }
                stale = Some((records, fetched_at));
            }
        }

        (self.load_from_source(stale).await, true)
    }

    /// 请求数据源；失败时依次回退到持久化条目和内存中的旧数据
    async fn load_from_source(&self, stale: Option<(Vec<GameRecord>, i64)>) -> Outcome {
        self.set_load_state(LoadState::Loading);

        match self.source.fetch_rows().await {
            Ok(rows) => {
                let mut records = normalize_rows(&rows);
                if self.options.shuffle_on_load {
                    records.shuffle(&mut rand::thread_rng());
                }
                let fetched_at = self.clock.now_millis();
                log::info!("已从数据源加载 {} 条游戏记录", records.len());
                let records = self.adopt(records, fetched_at);
                self.persist(&records, fetched_at).await;
                Ok(records)
            }
            Err(err) => {
                log::warn!("数据源请求失败: {}", err);
                let stale = match stale {
                    Some(entry) => Some(entry),
                    None => self.read_persisted().await,
                };
                if let Some((records, fetched_at)) = stale {
                    log::warn!("使用过期的持久化缓存，共 {} 条记录", records.len());
                    return Ok(self.adopt(records, fetched_at));
                }

                let mut state = self.state.write();
                if let Some(records) = state.records.clone() {
                    log::warn!("使用内存中的旧数据，共 {} 条记录", records.len());
                    state.load_state = LoadState::Ready;
                    return Ok(records);
                }
                state.load_state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// 读取并解析持久化条目；读取失败或数据损坏都视为未命中
    async fn read_persisted(&self) -> Option<(Vec<GameRecord>, i64)> {
        let entry = match self.store.read(&self.options.cache_key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("读取缓存失败: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<GameRecord>>(&entry.payload) {
            Ok(records) => {
                let records: Vec<GameRecord> = records
                    .into_iter()
                    .filter(|record| !record.name.trim().is_empty())
                    .collect();
                Some((records, entry.fetched_at))
            }
            Err(e) => {
                log::warn!("缓存数据已损坏，忽略: {}", e);
                None
            }
        }
    }

    async fn persist(&self, records: &[GameRecord], fetched_at: i64) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("序列化缓存失败: {}", e);
                return;
            }
        };

        if payload.len() > self.options.max_payload_bytes {
            log::warn!(
                "缓存数据过大（{} 字节，上限 {} 字节），仅保留在内存中",
                payload.len(),
                self.options.max_payload_bytes
            );
            return;
        }

        let entry = StoredEntry { payload, fetched_at };
        if let Err(e) = self.store.write(&self.options.cache_key, entry).await {
            log::warn!("写入缓存失败: {}", e);
        }
    }
}
