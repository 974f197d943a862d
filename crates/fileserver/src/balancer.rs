//! Least-latency connection selection

use backend::{Client, ConnectionHandle};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Measure one connection's round trip
///
/// A failed or timed out probe scores [`Duration::MAX`] so the connection
/// stays in the pool but loses to any responsive one.
pub async fn probe<C: Client>(connection: &ConnectionHandle<C>, limit: Duration) -> Duration {
    let started = Instant::now();
    match timeout(limit, connection.client().ping()).await {
        Ok(Ok(())) => started.elapsed(),
        Ok(Err(e)) => {
            tracing::warn!("Probe failed for bot {}: {}", connection.index() + 1, e);
            Duration::MAX
        }
        Err(_) => {
            tracing::warn!(
                "Probe timed out for bot {} after {:?}",
                connection.index() + 1,
                limit
            );
            Duration::MAX
        }
    }
}

/// Pick the connection with the lowest measured latency
///
/// Every connection is probed concurrently and all probes finish before the
/// choice is made. Ties go to the earliest connection in pool order.
/// Returns `None` only for an empty pool.
pub async fn select_connection<C: Client>(
    pool: &[Arc<ConnectionHandle<C>>],
    probe_timeout: Duration,
) -> Option<Arc<ConnectionHandle<C>>> {
    let latencies = join_all(pool.iter().map(|c| probe(c, probe_timeout))).await;

    let mut best: Option<(usize, Duration)> = None;
    for (position, latency) in latencies.into_iter().enumerate() {
        match best {
            Some((_, lowest)) if latency >= lowest => {}
            _ => best = Some((position, latency)),
        }
    }

    best.map(|(position, latency)| {
        let selected = &pool[position];
        tracing::debug!(
            "Selected bot {} (latency {:?}, load {})",
            selected.index() + 1,
            latency,
            selected.load()
        );
        Arc::clone(selected)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryClient;
    use backend::ClientPool;

    fn pool(clients: Vec<MemoryClient>) -> ClientPool<MemoryClient> {
        ClientPool::new(clients)
    }

    #[tokio::test(start_paused = true)]
    async fn test_selects_lowest_latency() {
        let pool = pool(vec![
            MemoryClient::empty().with_latency(Duration::from_millis(50)),
            MemoryClient::empty().with_latency(Duration::from_millis(10)),
            MemoryClient::empty().with_latency(Duration::from_millis(30)),
        ]);

        let selected = select_connection(pool.connections(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(selected.index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_run_concurrently() {
        let pool = pool(vec![
            MemoryClient::empty().with_latency(Duration::from_millis(50)),
            MemoryClient::empty().with_latency(Duration::from_millis(50)),
            MemoryClient::empty().with_latency(Duration::from_millis(50)),
        ]);

        let started = Instant::now();
        select_connection(pool.connections(), Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ties_go_to_first_in_pool_order() {
        let pool = pool(vec![
            MemoryClient::empty().with_latency(Duration::from_millis(40)),
            MemoryClient::empty().with_latency(Duration::from_millis(20)),
            MemoryClient::empty().with_latency(Duration::from_millis(20)),
        ]);

        let selected = select_connection(pool.connections(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(selected.index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_probe_is_worst_case_not_removed() {
        let pool = pool(vec![
            MemoryClient::empty().failing_ping(),
            MemoryClient::empty().with_latency(Duration::from_millis(80)),
        ]);

        let selected = select_connection(pool.connections(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(selected.index(), 1);

        // a pool of only failing connections still yields one
        let pool = self::pool(vec![MemoryClient::empty().failing_ping()]);
        let selected = select_connection(pool.connections(), Duration::from_secs(5)).await;
        assert_eq!(selected.unwrap().index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_times_out() {
        let pool = pool(vec![
            MemoryClient::empty().with_latency(Duration::from_secs(60)),
            MemoryClient::empty().with_latency(Duration::from_secs(2)),
        ]);

        let limit = Duration::from_secs(1);
        assert_eq!(probe(&pool.connections()[0], limit).await, Duration::MAX);

        let selected = select_connection(pool.connections(), limit).await.unwrap();
        // both time out, first in order wins
        assert_eq!(selected.index(), 0);
    }

    #[tokio::test]
    async fn test_empty_pool_selects_nothing() {
        let pool = pool(Vec::new());
        assert!(select_connection(pool.connections(), Duration::from_secs(1))
            .await
            .is_none());
    }
}
