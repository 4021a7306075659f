use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use somer_games_lib::database::dto::StoredEntry;
use somer_games_lib::utils::clock::ManualClock;
use somer_games_lib::{
    CacheOptions, CacheStore, CatalogError, GameCatalog, GameRecord, LoadState, MemoryStore, RawRow, RowSource,
};

const HOUR_MS: i64 = 60 * 60 * 1000;

/// 记录调用次数的数据源，可切换为失败并模拟网络延迟
struct CountingSource {
    rows: Vec<RawRow>,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl CountingSource {
    fn new(names: &[&str]) -> Self {
        Self {
            rows: names
                .iter()
                .map(|name| RawRow::Positional(vec![name.to_string()]))
                .collect(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RowSource for CountingSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::SourceStatus(503));
        }
        Ok(self.rows.clone())
    }
}

/// 读取前先等待一段时间的存储，用来把一次缓存命中拖长
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl CacheStore for SlowStore {
    async fn read(&self, key: &str) -> Result<Option<StoredEntry>, CatalogError> {
        tokio::time::sleep(self.delay).await;
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, entry: StoredEntry) -> Result<(), CatalogError> {
        self.inner.write(key, entry).await
    }

    async fn remove(&self, key: &str) -> Result<(), CatalogError> {
        self.inner.remove(key).await
    }
}

fn catalog(source: CountingSource, clock: &Arc<ManualClock>) -> GameCatalog<CountingSource, MemoryStore> {
    GameCatalog::new(source, MemoryStore::new(), CacheOptions::default()).with_clock(clock.clone())
}

fn payload(names: &[&str]) -> String {
    let records: Vec<GameRecord> = names.iter().filter_map(|name| GameRecord::named(*name)).collect();
    serde_json::to_string(&records).unwrap()
}

fn names(records: &[GameRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn fresh_memory_is_served_without_source_call() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(CountingSource::new(&["Bomba", "Névlánc"]), &clock);

    let first = catalog.fetch_records(false).await.unwrap();
    let second = catalog.fetch_records(false).await.unwrap();

    assert_eq!(names(&first), vec!["Bomba", "Névlánc"]);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(catalog.source().calls(), 1);
    assert_eq!(catalog.store().len(), 1);
}

#[tokio::test]
async fn entry_aged_exactly_ttl_is_still_valid() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(CountingSource::new(&["Bomba"]), &clock);
    catalog.fetch_records(false).await.unwrap();

    clock.set(HOUR_MS);
    catalog.fetch_records(false).await.unwrap();
    assert_eq!(catalog.source().calls(), 1);

    clock.set(HOUR_MS + 1);
    catalog.fetch_records(false).await.unwrap();
    assert_eq!(catalog.source().calls(), 2);
    assert_eq!(catalog.store().get(&catalog.options().cache_key).unwrap().fetched_at, HOUR_MS + 1);
}

#[tokio::test]
async fn persisted_entry_aged_exactly_ttl_is_adopted_on_cold_start() {
    let clock = Arc::new(ManualClock::new(10 * HOUR_MS));
    let catalog = catalog(CountingSource::new(&["Friss"]), &clock);
    catalog
        .store()
        .insert_raw(&catalog.options().cache_key, payload(&["Tárolt"]), 9 * HOUR_MS);

    let records = catalog.fetch_records(false).await.unwrap();
    assert_eq!(names(&records), vec!["Tárolt"]);
    assert_eq!(catalog.source().calls(), 0);
}

#[tokio::test]
async fn persisted_entry_one_ms_past_ttl_is_refreshed_on_cold_start() {
    let clock = Arc::new(ManualClock::new(10 * HOUR_MS));
    let catalog = catalog(CountingSource::new(&["Friss"]), &clock);
    catalog
        .store()
        .insert_raw(&catalog.options().cache_key, payload(&["Tárolt"]), 9 * HOUR_MS - 1);

    let records = catalog.fetch_records(false).await.unwrap();
    assert_eq!(names(&records), vec!["Friss"]);
    assert_eq!(catalog.source().calls(), 1);
    assert_eq!(catalog.store().get(&catalog.options().cache_key).unwrap().fetched_at, 10 * HOUR_MS);
}

#[tokio::test]
async fn unexpired_persisted_entry_is_adopted() {
    let clock = Arc::new(ManualClock::new(10 * HOUR_MS));
    let catalog = catalog(CountingSource::new(&["Friss"]), &clock);
    catalog
        .store()
        .insert_raw(&catalog.options().cache_key, payload(&["Tárolt"]), 10 * HOUR_MS - 1_000);

    let records = catalog.fetch_records(false).await.unwrap();
    assert_eq!(names(&records), vec!["Tárolt"]);
    assert_eq!(catalog.source().calls(), 0);
    assert_eq!(catalog.load_state(), LoadState::Ready);
}

#[tokio::test]
async fn expired_persisted_entry_is_refreshed_from_source() {
    let clock = Arc::new(ManualClock::new(10 * HOUR_MS));
    let catalog = catalog(CountingSource::new(&["Friss"]), &clock);
    catalog
        .store()
        .insert_raw(&catalog.options().cache_key, payload(&["Tárolt"]), 0);

    let records = catalog.fetch_records(false).await.unwrap();
    assert_eq!(names(&records), vec!["Friss"]);
    assert_eq!(catalog.source().calls(), 1);
}

#[tokio::test]
async fn source_failure_falls_back_to_stale_entry() {
    let clock = Arc::new(ManualClock::new(10 * HOUR_MS));
    let catalog = catalog(CountingSource::new(&["Friss"]).failing(), &clock);
    catalog
        .store()
        .insert_raw(&catalog.options().cache_key, payload(&["Régi"]), 0);

    let records = catalog.fetch_records(false).await.unwrap();
    assert_eq!(names(&records), vec!["Régi"]);
    assert_eq!(catalog.load_state(), LoadState::Ready);

    // 过期条目保留原时间戳，下一次调用仍会重试数据源
    catalog.fetch_records(false).await.unwrap();
    assert_eq!(catalog.source().calls(), 2);
}

#[tokio::test]
async fn source_failure_without_cache_is_reported() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(CountingSource::new(&["Bomba"]).failing(), &clock);

    let err = catalog.fetch_records(false).await.unwrap_err();
    assert_eq!(err, CatalogError::SourceStatus(503));
    assert!(err.is_source_error());
    assert!(matches!(catalog.load_state(), LoadState::Failed(_)));
    assert!(!catalog.status().is_loaded);
}

#[tokio::test]
async fn corrupted_entry_is_treated_as_miss() {
    let clock = Arc::new(ManualClock::new(HOUR_MS));
    let catalog = catalog(CountingSource::new(&["Bomba"]), &clock);
    catalog
        .store()
        .insert_raw(&catalog.options().cache_key, "{ ez nem json", HOUR_MS);

    let records = catalog.fetch_records(false).await.unwrap();
    assert_eq!(names(&records), vec!["Bomba"]);
    assert_eq!(catalog.source().calls(), 1);

    let stored = catalog.store().get(&catalog.options().cache_key).unwrap();
    let restored: Vec<GameRecord> = serde_json::from_str(&stored.payload).unwrap();
    assert_eq!(names(&restored), vec!["Bomba"]);
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(CountingSource::new(&["Bomba"]), &clock);
    catalog.fetch_records(false).await.unwrap();

    catalog.clear_cache().await.unwrap();
    assert!(catalog.store().is_empty());
    assert!(catalog.records().is_none());
    assert_eq!(catalog.load_state(), LoadState::Idle);

    catalog.fetch_records(false).await.unwrap();
    assert_eq!(catalog.source().calls(), 2);
}

#[tokio::test]
async fn force_refresh_bypasses_fresh_cache() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(CountingSource::new(&["Bomba"]), &clock);
    catalog.fetch_records(false).await.unwrap();

    clock.advance(1_000);
    catalog.fetch_records(true).await.unwrap();
    assert_eq!(catalog.source().calls(), 2);
    assert_eq!(catalog.store().get(&catalog.options().cache_key).unwrap().fetched_at, 1_000);
}

#[tokio::test]
async fn concurrent_callers_share_one_fetch() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(
        CountingSource::new(&["Bomba"]).slow(Duration::from_millis(50)),
        &clock,
    );

    let (first, second) = tokio::join!(catalog.fetch_records(false), catalog.fetch_records(false));
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(catalog.source().calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(
        CountingSource::new(&["Bomba"])
            .slow(Duration::from_millis(50))
            .failing(),
        &clock,
    );

    let (first, second) = tokio::join!(catalog.fetch_records(false), catalog.fetch_records(false));

    assert_eq!(catalog.source().calls(), 1);
    assert_eq!(first.unwrap_err(), CatalogError::SourceStatus(503));
    assert_eq!(second.unwrap_err(), CatalogError::SourceStatus(503));
}

#[tokio::test]
async fn forced_refresh_during_cache_load_still_hits_source() {
    let clock = Arc::new(ManualClock::new(HOUR_MS));
    let store = SlowStore {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(50),
    };
    let options = CacheOptions::default();
    store.inner.insert_raw(&options.cache_key, payload(&["Tárolt"]), HOUR_MS);
    let catalog = GameCatalog::new(CountingSource::new(&["Friss"]), store, options).with_clock(clock.clone());

    let (cached, forced) = tokio::join!(catalog.fetch_records(false), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        catalog.fetch_records(true).await
    });

    assert_eq!(names(&cached.unwrap()), vec!["Tárolt"]);
    assert_eq!(names(&forced.unwrap()), vec!["Friss"]);
    assert_eq!(catalog.source().calls(), 1);
}

#[tokio::test]
async fn forced_refresh_during_source_fetch_reuses_it() {
    let clock = Arc::new(ManualClock::new(0));
    let catalog = catalog(
        CountingSource::new(&["Bomba"]).slow(Duration::from_millis(50)),
        &clock,
    );

    let (first, forced) = tokio::join!(catalog.fetch_records(false), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        catalog.fetch_records(true).await
    });

    assert_eq!(catalog.source().calls(), 1);
    assert!(Arc::ptr_eq(&first.unwrap(), &forced.unwrap()));
}

#[tokio::test]
async fn store_trait_is_usable_directly() {
    let store = MemoryStore::new();
    assert_eq!(store.read("hiányzó").await.unwrap(), None);
}
