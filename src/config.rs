//! Top-level configuration for a ledger process.
//!
//! This module aggregates configuration for:
//!
//! - persistent storage (RocksDB path and creation flag),
//! - metrics exporter (enable flag + listen address).
//!
//! Genesis is deliberately not part of this struct: unlike storage path
//! or metrics toggle, it isn't safely defaultable -- it's a signed
//! block tied to one specific network, so callers build a
//! [`crate::ledger::GenesisConfig`] explicitly and pass it to
//! [`crate::ledger::Ledger::open`] rather than pulling it from a config
//! file.

use std::net::SocketAddr;

use crate::storage::RocksDbConfig;

/// Configuration for the persistent store.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub rocksdb: RocksDbConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            rocksdb: RocksDbConfig::default(),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9898"
            .parse()
            .expect("hard-coded metrics listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level configuration for a ledger process.
///
/// This aggregates the sub-configs needed to wire up a typical node:
///
/// - persistent storage (`storage`),
/// - Prometheus metrics exporter (`metrics`).
#[derive(Clone, Debug, Default)]
pub struct LedgerConfig {
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}
