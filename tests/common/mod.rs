#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use linkcore::infrastructure::cache::{CacheResult, CacheService, NullCache};
use linkcore::infrastructure::memory::{MemoryLinkRepository, MemoryTokenRepository};
use linkcore::routes::router;
use linkcore::state::{AppState, StateParts};
use linkcore::utils::code_generator::{CodeGenerator, RandomCodeGenerator};

pub const TEST_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "https://sho.rt";

/// Always proposes the same code.
pub struct FixedGenerator(pub &'static str);

impl CodeGenerator for FixedGenerator {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

/// Counts how many candidates were requested.
pub struct CountingGenerator {
    inner: FixedGenerator,
    pub calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(code: &'static str) -> Self {
        Self {
            inner: FixedGenerator(code),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for CountingGenerator {
    fn generate(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate()
    }
}

/// Cache kept in a map. Writes can be delayed to mimic a slow backend.
#[derive(Default)]
pub struct MapCache {
    entries: DashMap<String, String>,
    write_delay: Option<Duration>,
}

impl MapCache {
    pub fn with_write_delay(delay: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            write_delay: Some(delay),
        }
    }

    pub fn contains(&self, short_code: &str) -> bool {
        self.entries.contains_key(short_code)
    }

    /// Polls until `short_code` is cached, for fills running in the background.
    pub async fn wait_for(&self, short_code: &str) {
        for _ in 0..100 {
            if self.contains(short_code) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("{short_code} never reached the cache");
    }
}

#[async_trait]
impl CacheService for MapCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(short_code).map(|url| url.value().clone()))
    }

    async fn set_url(&self, short_code: &str, url: &str, _: Option<u64>) -> CacheResult<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        self.entries.insert(short_code.to_string(), url.to_string());
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.entries.remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "map"
    }
}

/// Memory-backed state with random 7-character codes.
pub fn memory_state() -> AppState {
    memory_state_with(Arc::new(RandomCodeGenerator::default()), 10)
}

pub fn memory_state_with(generator: Arc<dyn CodeGenerator>, max_attempts: u32) -> AppState {
    build_state(generator, max_attempts, Arc::new(NullCache::new()))
}

/// Memory-backed state in front of the given cache.
pub fn memory_state_with_cache(cache: Arc<dyn CacheService>) -> AppState {
    build_state(Arc::new(RandomCodeGenerator::default()), 10, cache)
}

fn build_state(
    generator: Arc<dyn CodeGenerator>,
    max_attempts: u32,
    cache: Arc<dyn CacheService>,
) -> AppState {
    AppState::new(StateParts {
        link_repository: Arc::new(MemoryLinkRepository::new()),
        token_repository: Arc::new(MemoryTokenRepository::new()),
        cache,
        generator,
        max_attempts,
        signing_secret: TEST_SECRET.to_string(),
        public_base_url: BASE_URL.to_string(),
    })
}

/// Registers a bearer token and returns `(raw_token, token_id)`.
pub async fn issue_token(state: &AppState, name: &str) -> (String, i64) {
    let raw = format!("{}-raw-token", name);
    let token = state.auth_service.issue_token(name, &raw).await.unwrap();
    (raw, token.id)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}
