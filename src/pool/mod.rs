//! Connection pooling for validation requests.
//!
//! The pool hands out transport handles and reclaims them after use. An
//! idle handle is reused when one is available; otherwise a fresh handle
//! is created. Creation is unbounded, only the idle set is capped. With
//! pooling disabled the pool degrades transparently: every acquire
//! creates and every release discards.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::config::ConfigStore;
use crate::errors::{ValidationError, ValidationResult};
use crate::transport::{HttpTransport, ReqwestTransport, TransportError};

/// Default number of idle handles the pool retains.
pub const DEFAULT_MAX_IDLE: usize = 10;

/// Tuning for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolTuning {
    /// Maximum number of idle handles retained for reuse.
    pub max_idle: usize,
}

impl Default for PoolTuning {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

impl PoolTuning {
    /// Creates tuning with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the idle-set capacity.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }
}

/// A transport handle borrowed from the pool.
///
/// Owned exclusively by the pool while idle; ownership moves to exactly
/// one in-flight request between `acquire` and `release`. Dropping the
/// handle releases its underlying resources.
pub struct PooledConnection {
    id: Uuid,
    transport: Arc<dyn HttpTransport>,
}

impl PooledConnection {
    /// Wraps a transport in a pooled handle.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
        }
    }

    /// Returns the handle's id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the transport backing this handle.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.id)
            .finish()
    }
}

/// Creates transport handles on demand for the pool.
pub trait ConnectionFactory: Send + Sync {
    /// Creates a fresh transport handle.
    fn create(&self) -> Result<PooledConnection, TransportError>;
}

/// Factory producing reqwest-backed handles from the active configuration.
///
/// Each handle bakes in the timeout and client certificate from the
/// configuration snapshot current at creation time.
#[derive(Debug)]
pub struct ReqwestConnectionFactory {
    config: Arc<ConfigStore>,
}

impl ReqwestConnectionFactory {
    /// Creates a factory reading from the given configuration store.
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self { config }
    }
}

impl ConnectionFactory for ReqwestConnectionFactory {
    fn create(&self) -> Result<PooledConnection, TransportError> {
        let config = self.config.current();
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(PooledConnection::new(Arc::new(transport)))
    }
}

/// Factory handing out handles that all share one transport.
///
/// Used when the client is built with an injected transport (tests and
/// scripted mocks); creation never fails.
pub struct StaticConnectionFactory {
    transport: Arc<dyn HttpTransport>,
}

impl StaticConnectionFactory {
    /// Creates a factory wrapping the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

impl ConnectionFactory for StaticConnectionFactory {
    fn create(&self) -> Result<PooledConnection, TransportError> {
        Ok(PooledConnection::new(Arc::clone(&self.transport)))
    }
}

/// Point-in-time pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Handles created by the factory.
    pub created: u64,
    /// Acquisitions served from the idle set.
    pub reused: u64,
    /// Handles discarded on release (capacity reached or pooling off).
    pub discarded: u64,
    /// Handles currently idle.
    pub idle: usize,
}

impl PoolStats {
    /// Fraction of acquisitions served without creating a handle.
    pub fn reuse_rate(&self) -> f64 {
        let total = self.created + self.reused;
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}

/// Pool of reusable transport handles.
pub struct ConnectionPool {
    config: Arc<ConfigStore>,
    factory: Arc<dyn ConnectionFactory>,
    tuning: PoolTuning,
    idle: Mutex<VecDeque<PooledConnection>>,
    created: AtomicU64,
    reused: AtomicU64,
    discarded: AtomicU64,
}

impl ConnectionPool {
    /// Creates a pool over the given factory.
    pub fn new(
        config: Arc<ConfigStore>,
        factory: Arc<dyn ConnectionFactory>,
        tuning: PoolTuning,
    ) -> Self {
        Self {
            config,
            factory,
            tuning,
            idle: Mutex::new(VecDeque::new()),
            created: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Borrows a handle, reusing an idle one when pooling allows it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PoolExhausted`] when a fresh handle is
    /// needed and the factory fails to create one. The pool never retries.
    pub fn acquire(&self) -> ValidationResult<PooledConnection> {
        if self.config.current().enable_connection_pooling {
            if let Ok(mut idle) = self.idle.lock() {
                if let Some(connection) = idle.pop_front() {
                    self.reused.fetch_add(1, Ordering::Relaxed);
                    debug!(connection_id = %connection.id(), "Reusing pooled connection");
                    return Ok(connection);
                }
            }
        }

        let connection = self
            .factory
            .create()
            .map_err(|e| ValidationError::pool_exhausted(e.to_string()))?;
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!(connection_id = %connection.id(), "Created connection");
        Ok(connection)
    }

    /// Returns a handle to the idle set, or discards it.
    ///
    /// Retained only while pooling is enabled and the idle set is below
    /// capacity; otherwise the handle is dropped and its resources freed.
    pub fn release(&self, connection: PooledConnection) {
        if self.config.current().enable_connection_pooling {
            if let Ok(mut idle) = self.idle.lock() {
                if idle.len() < self.tuning.max_idle {
                    debug!(connection_id = %connection.id(), "Returned connection to pool");
                    idle.push_front(connection);
                    return;
                }
            }
        }

        self.discarded.fetch_add(1, Ordering::Relaxed);
        debug!(connection_id = %connection.id(), "Discarded connection");
    }

    /// Number of handles currently idle.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    /// Drops every idle handle.
    pub fn clear(&self) {
        if let Ok(mut idle) = self.idle.lock() {
            let dropped = idle.len();
            idle.clear();
            if dropped > 0 {
                debug!(dropped, "Cleared idle connections");
            }
        }
    }

    /// Returns current pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            idle: self.idle_count(),
        }
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("tuning", &self.tuning)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::mocks::MockTransport;

    struct CountingFactory {
        transport: Arc<MockTransport>,
        failures: AtomicU64,
    }

    impl CountingFactory {
        fn new() -> Self {
            Self {
                transport: Arc::new(MockTransport::new()),
                failures: AtomicU64::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                transport: Arc::new(MockTransport::new()),
                failures: AtomicU64::new(u64::MAX),
            }
        }
    }

    impl ConnectionFactory for CountingFactory {
        fn create(&self) -> Result<PooledConnection, TransportError> {
            if self.failures.load(Ordering::Relaxed) > 0 {
                return Err(TransportError::Connection {
                    message: "factory offline".to_string(),
                });
            }
            Ok(PooledConnection::new(
                Arc::clone(&self.transport) as Arc<dyn HttpTransport>
            ))
        }
    }

    fn store_with(pooling: bool) -> Arc<ConfigStore> {
        let mut config = ValidationConfig::default();
        config.enable_connection_pooling = pooling;
        Arc::new(ConfigStore::new(config))
    }

    #[test]
    fn test_acquire_creates_then_reuses() {
        let pool = ConnectionPool::new(
            store_with(true),
            Arc::new(CountingFactory::new()),
            PoolTuning::default(),
        );

        let first = pool.acquire().unwrap();
        let first_id = first.id();
        pool.release(first);
        assert_eq!(pool.idle_count(), 1);

        let second = pool.acquire().unwrap();
        assert_eq!(second.id(), first_id);
        assert_eq!(pool.idle_count(), 0);

        let stats = pool.stats();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.reused, 1);
    }

    #[test]
    fn test_capacity_n_retains_n_discards_extra() {
        let capacity = 3;
        let pool = ConnectionPool::new(
            store_with(true),
            Arc::new(CountingFactory::new()),
            PoolTuning::new().with_max_idle(capacity),
        );

        let connections: Vec<_> = (0..capacity + 1).map(|_| pool.acquire().unwrap()).collect();
        for connection in connections {
            pool.release(connection);
        }

        assert_eq!(pool.idle_count(), capacity);
        let stats = pool.stats();
        assert_eq!(stats.created, capacity as u64 + 1);
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_disabled_pooling_always_creates_and_discards() {
        let pool = ConnectionPool::new(
            store_with(false),
            Arc::new(CountingFactory::new()),
            PoolTuning::default(),
        );

        for _ in 0..3 {
            let connection = pool.acquire().unwrap();
            pool.release(connection);
        }

        assert_eq!(pool.idle_count(), 0);
        let stats = pool.stats();
        assert_eq!(stats.created, 3);
        assert_eq!(stats.reused, 0);
        assert_eq!(stats.discarded, 3);
    }

    #[test]
    fn test_toggle_observed_per_use() {
        let store = store_with(true);
        let pool = ConnectionPool::new(
            Arc::clone(&store),
            Arc::new(CountingFactory::new()),
            PoolTuning::default(),
        );

        let connection = pool.acquire().unwrap();

        let mut config = (*store.current()).clone();
        config.enable_connection_pooling = false;
        store.replace(config);

        // Released after the toggle flipped: discarded, not retained.
        pool.release(connection);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_factory_failure_is_pool_exhausted() {
        let pool = ConnectionPool::new(
            store_with(true),
            Arc::new(CountingFactory::failing()),
            PoolTuning::default(),
        );

        let result = pool.acquire();
        assert!(matches!(
            result,
            Err(ValidationError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn test_clear_drops_idle_handles() {
        let pool = ConnectionPool::new(
            store_with(true),
            Arc::new(CountingFactory::new()),
            PoolTuning::default(),
        );

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.idle_count(), 2);

        pool.clear();
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_reuse_rate() {
        let stats = PoolStats {
            created: 1,
            reused: 3,
            discarded: 0,
            idle: 1,
        };
        assert!((stats.reuse_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(PoolStats::default().reuse_rate(), 0.0);
    }
}
