//! Ledger library crate.
//!
//! This crate provides the core building blocks for a block-lattice
//! ledger:
//!
//! - strongly-typed domain types (`types`) and fixed-width integers (`primitives`),
//! - hashing, signing, and key-derivation primitives (`crypto`),
//! - the seven-table persistent store (`storage`),
//! - the ledger state machine and rollback (`ledger`),
//! - representative vote tallying (`votes`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level process configuration (`config`).
//!
//! Higher-level binaries can compose these pieces to build ledger
//! nodes, bootstrapping clients, and experiment harnesses. Networking,
//! bootstrap peer selection, and wallet management are out of scope --
//! this crate is the ledger itself, not the node around it.

pub mod config;
pub mod crypto;
pub mod ledger;
pub mod metrics;
pub mod primitives;
pub mod storage;
pub mod types;
pub mod votes;

pub use config::{LedgerConfig, MetricsConfig, StorageConfig};
pub use ledger::{GenesisConfig, Ledger, ProcessResult};
pub use metrics::{LedgerMetrics, MetricsRegistry, run_prometheus_http_server};
pub use primitives::{CodecError, U128, U256, U512};
pub use storage::{LedgerStore, MemLedgerStore, RocksDbConfig, RocksDbLedgerStore, StoreError, StoreOp};
pub use votes::{Vote, Votes};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// The default persistent [`LedgerStore`] backend.
pub type DefaultLedgerStore = RocksDbLedgerStore;

/// The default ledger stack: a [`Ledger`] over the default store.
pub type DefaultLedger = Ledger<DefaultLedgerStore>;
