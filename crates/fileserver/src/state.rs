//! Shared server state injected into every request handler

use backend::{Client, ClientPool};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{AdapterCache, DEFAULT_CACHE_LIMIT};
use crate::streamer::{ByteStreamer, DEFAULT_CHUNK_SIZE};

/// Tunables for streaming requests
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Backend block size in bytes
    pub chunk_size: u64,
    /// Maximum number of cached per-connection adapters
    pub cache_limit: usize,
    /// Upper bound for one latency probe
    pub probe_timeout: Duration,
    /// Upper bound for one backend resolve or fetch call
    pub fetch_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cache_limit: DEFAULT_CACHE_LIMIT,
            probe_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Server state: the connection pool, the adapter cache and settings
///
/// Built once at startup and cloned cheaply into each handler.
pub struct ServerState<C> {
    pool: Arc<ClientPool<C>>,
    adapters: Arc<AdapterCache<usize, ByteStreamer<C>>>,
    settings: StreamSettings,
    bot_username: String,
    started_at: DateTime<Utc>,
}

impl<C> Clone for ServerState<C> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            adapters: Arc::clone(&self.adapters),
            settings: self.settings.clone(),
            bot_username: self.bot_username.clone(),
            started_at: self.started_at,
        }
    }
}

impl<C: Client> ServerState<C> {
    /// Create new server state
    ///
    /// # Arguments
    /// * `pool` - Backend connections to balance requests across
    /// * `bot_username` - Username of the main bot, shown on the status page
    /// * `settings` - Streaming tunables
    pub fn new(pool: ClientPool<C>, bot_username: String, settings: StreamSettings) -> Self {
        let adapters = AdapterCache::new(settings.cache_limit);
        Self {
            pool: Arc::new(pool),
            adapters: Arc::new(adapters),
            settings,
            bot_username,
            started_at: Utc::now(),
        }
    }

    pub fn pool(&self) -> &ClientPool<C> {
        &self.pool
    }

    pub fn adapters(&self) -> &AdapterCache<usize, ByteStreamer<C>> {
        &self.adapters
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn bot_username(&self) -> &str {
        &self.bot_username
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        let age = Utc::now().signed_duration_since(self.started_at);
        age.num_seconds().max(0) as u64
    }

    /// Per-bot loads ranked from busiest to idlest, labelled `bot1..botN`
    pub fn ranked_loads(&self) -> Vec<(String, usize)> {
        let mut loads: Vec<usize> = self.pool.loads().into_iter().map(|(_, load)| load).collect();
        loads.sort_unstable_by(|a, b| b.cmp(a));
        loads
            .into_iter()
            .enumerate()
            .map(|(rank, load)| (format!("bot{}", rank + 1), load))
            .collect()
    }
}
