//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and a set of strongly-typed ledger metrics, and an async
//! HTTP exporter that serves `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{self, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};

use crate::ledger::ProcessResult;

/// Ledger-related Prometheus metrics.
///
/// These are registered into a [`Registry`] and updated from
/// [`crate::ledger::Ledger::process`]/[`crate::ledger::Ledger::rollback`]
/// call sites.
#[derive(Clone)]
pub struct LedgerMetrics {
    /// Latency of a single `process()` call, in seconds.
    pub process_seconds: Histogram,
    /// Blocks accepted.
    pub progress_total: IntCounter,
    /// Blocks rejected for a bad signature.
    pub bad_signature_total: IntCounter,
    /// Blocks that were already present.
    pub old_total: IntCounter,
    /// Blocks rejected as an overspend.
    pub overspend_total: IntCounter,
    /// Blocks rejected as an overreceive.
    pub overreceive_total: IntCounter,
    /// Blocks recorded as a losing fork.
    pub fork_total: IntCounter,
    /// Blocks rejected for a missing `previous`.
    pub gap_previous_total: IntCounter,
    /// Blocks rejected for a missing `source`.
    pub gap_source_total: IntCounter,
    /// Blocks rejected because their source wasn't a send.
    pub not_receive_from_send_total: IntCounter,
    /// Number of completed rollbacks.
    pub rollback_total: IntCounter,
    /// Live account count, sampled periodically.
    pub accounts_total: Gauge,
    /// `supply() - genesis.balance`, sampled periodically; should stay
    /// at zero in a healthy ledger (§4.3 conservation invariant).
    pub supply_micro_discrepancy: Gauge,
}

impl LedgerMetrics {
    /// Registers ledger metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let process_seconds = Histogram::with_opts(
            HistogramOpts::new("ledger_process_seconds", "Time to process a single block, in seconds").buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(process_seconds.clone()))?;

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let c = IntCounter::with_opts(Opts::new(name, help))?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };

        let progress_total = counter("ledger_process_progress_total", "Blocks accepted")?;
        let bad_signature_total = counter("ledger_process_bad_signature_total", "Blocks rejected for a bad signature")?;
        let old_total = counter("ledger_process_old_total", "Blocks that were already present")?;
        let overspend_total = counter("ledger_process_overspend_total", "Blocks rejected as an overspend")?;
        let overreceive_total = counter("ledger_process_overreceive_total", "Blocks rejected as an overreceive")?;
        let fork_total = counter("ledger_process_fork_total", "Blocks recorded as a losing fork")?;
        let gap_previous_total = counter("ledger_process_gap_previous_total", "Blocks rejected for a missing previous")?;
        let gap_source_total = counter("ledger_process_gap_source_total", "Blocks rejected for a missing source")?;
        let not_receive_from_send_total = counter(
            "ledger_process_not_receive_from_send_total",
            "Blocks rejected because their source wasn't a send",
        )?;
        let rollback_total = counter("ledger_rollback_total", "Number of completed rollbacks")?;

        let accounts_total = Gauge::with_opts(Opts::new("ledger_accounts_total", "Live account count"))?;
        registry.register(Box::new(accounts_total.clone()))?;

        let supply_micro_discrepancy = Gauge::with_opts(Opts::new(
            "ledger_supply_micro_discrepancy",
            "supply() minus the genesis balance; should stay at zero",
        ))?;
        registry.register(Box::new(supply_micro_discrepancy.clone()))?;

        Ok(Self {
            process_seconds,
            progress_total,
            bad_signature_total,
            old_total,
            overspend_total,
            overreceive_total,
            fork_total,
            gap_previous_total,
            gap_source_total,
            not_receive_from_send_total,
            rollback_total,
            accounts_total,
            supply_micro_discrepancy,
        })
    }

    /// Increments the counter matching `result`.
    pub fn record(&self, result: ProcessResult) {
        match result {
            ProcessResult::Progress => self.progress_total.inc(),
            ProcessResult::BadSignature => self.bad_signature_total.inc(),
            ProcessResult::Old => self.old_total.inc(),
            ProcessResult::Overspend => self.overspend_total.inc(),
            ProcessResult::Overreceive => self.overreceive_total.inc(),
            ProcessResult::Fork => self.fork_total.inc(),
            ProcessResult::GapPrevious => self.gap_previous_total.inc(),
            ProcessResult::GapSource => self.gap_source_total.inc(),
            ProcessResult::NotReceiveFromSend => self.not_receive_from_send_total.inc(),
        }
    }
}

/// Wrapper around a Prometheus registry and the ledger metrics.
///
/// This is the main handle you pass around in the node. It can be
/// wrapped in an [`Arc`] and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub ledger: LedgerMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// and registers the ledger metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("ledger".to_string()), None)?;
        let ledger = LedgerMetrics::register(&registry)?;
        Ok(Self { registry, ledger })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            eprintln!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// The server listens on `addr` and serves `GET /metrics` with the
/// Prometheus text exposition format. All other paths return 404.
///
/// This function is `async` and is intended to be spawned onto a Tokio
/// runtime, e.g.:
///
/// ```ignore
/// let registry = Arc::new(MetricsRegistry::new()?);
/// let addr: SocketAddr = "127.0.0.1:9898".parse()?;
/// tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
/// ```
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                eprintln!("prometheus HTTP server error: {err}");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            let body = metrics.gather_text();
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(body)))
                .unwrap())
        }
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from("not found")))
            .unwrap()),
    }
}
