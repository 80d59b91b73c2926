//! Query and write telemetry.
//!
//! Every catalog read reports here once: counters are bumped per operation and a JSON
//! line goes to the `bookstore::metrics` target. Writes produce audit lines on
//! `bookstore::audit`. Both are mirrored to the dev6 capture for tests.

use crate::config::DEFAULT_SLOW_QUERY_MS;
use crate::utils::num::{u128_to_u64_saturating, usize_to_u64};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one operation name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpStats {
    pub calls: u64,
    pub slow: u64,
    pub indexed: u64,
    pub returned: u64,
    pub max_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub queries_total: u64,
    pub queries_slow_total: u64,
    pub index_hits_total: u64,
    pub writes_total: u64,
    pub per_op: Vec<(&'static str, OpStats)>,
}

struct Telemetry {
    slow_query_ms: AtomicU64,
    writes: AtomicU64,
    ops: RwLock<BTreeMap<&'static str, OpStats>>,
}

static TELEMETRY: LazyLock<Telemetry> = LazyLock::new(|| Telemetry {
    slow_query_ms: AtomicU64::new(
        std::env::var("BOOKSTORE_SLOW_QUERY_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_SLOW_QUERY_MS),
    ),
    writes: AtomicU64::new(0),
    ops: RwLock::new(BTreeMap::new()),
});

pub fn set_slow_query_ms(ms: u64) {
    TELEMETRY.slow_query_ms.store(ms, Ordering::Relaxed);
}

#[must_use]
pub fn slow_query_ms() -> u64 {
    TELEMETRY.slow_query_ms.load(Ordering::Relaxed)
}

fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// SHA-256 hex of a filter's debug rendering, so logs never carry raw values.
#[must_use]
pub fn filter_hash(filter_dbg: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(filter_dbg.as_bytes()))
}

/// Records one read operation.
pub fn log_query(op: &'static str, filter_dbg: &str, returned: usize, used_index: Option<&str>, duration_ms: u128) {
    let duration = u128_to_u64_saturating(duration_ms);
    let slow = duration >= slow_query_ms();
    {
        let mut ops = TELEMETRY.ops.write();
        let s = ops.entry(op).or_default();
        s.calls += 1;
        s.slow += u64::from(slow);
        s.indexed += u64::from(used_index.is_some());
        s.returned = s.returned.saturating_add(usize_to_u64(returned));
        s.max_ms = s.max_ms.max(duration);
    }
    if slow {
        log::warn!("slow query: op={op} duration_ms={duration}");
    }
    let line = serde_json::json!({
        "ts": now_ts(),
        "op": op,
        "filter_hash": filter_hash(filter_dbg),
        "returned": usize_to_u64(returned),
        "used_index": used_index,
        "duration_ms": duration,
        "slow": slow,
    })
    .to_string();
    log::info!(target: "bookstore::metrics", "{line}");
    crate::dev6!(channel = "metrics", "{line}");
}

/// Records one write. `key` is the targeted title, or the inserted record's title.
pub fn log_audit(op: &str, key: &str, matched: bool) {
    TELEMETRY.writes.fetch_add(1, Ordering::Relaxed);
    let line = serde_json::json!({ "ts": now_ts(), "op": op, "key": key, "matched": matched }).to_string();
    log::info!(target: "bookstore::audit", "{line}");
    crate::dev6!(channel = "audit", "{line}");
}

#[must_use]
pub fn op_stats(op: &str) -> Option<OpStats> {
    TELEMETRY.ops.read().get(op).copied()
}

#[must_use]
pub fn snapshot() -> TelemetrySnapshot {
    let ops = TELEMETRY.ops.read();
    let mut snap = TelemetrySnapshot {
        writes_total: TELEMETRY.writes.load(Ordering::Relaxed),
        ..TelemetrySnapshot::default()
    };
    for (&op, s) in ops.iter() {
        snap.queries_total += s.calls;
        snap.queries_slow_total += s.slow;
        snap.index_hits_total += s.indexed;
        snap.per_op.push((op, *s));
    }
    snap
}

#[must_use]
pub fn queries_total() -> u64 {
    snapshot().queries_total
}

#[must_use]
pub fn writes_total() -> u64 {
    TELEMETRY.writes.load(Ordering::Relaxed)
}

/// Prometheus text exposition of the counters, with one labeled series per operation.
#[must_use]
pub fn metrics_text() -> String {
    let snap = snapshot();
    let mut out = String::new();
    for (name, help, v) in [
        ("bookstore_queries_total", "Catalog reads.", snap.queries_total),
        ("bookstore_queries_slow_total", "Reads at or over the slow threshold.", snap.queries_slow_total),
        ("bookstore_index_hits_total", "Reads served by an index.", snap.index_hits_total),
        ("bookstore_writes_total", "Insert, update and delete calls.", snap.writes_total),
    ] {
        let _ = writeln!(out, "# HELP {name} {help}\n# TYPE {name} counter\n{name} {v}");
    }
    let _ = writeln!(out, "# TYPE bookstore_op_calls_total counter");
    for (op, s) in &snap.per_op {
        let _ = writeln!(out, "bookstore_op_calls_total{{op=\"{op}\"}} {}", s.calls);
    }
    out
}
