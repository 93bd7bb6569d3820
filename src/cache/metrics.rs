// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	misses: AtomicU64,
	failures: AtomicU64,
}
impl CacheMetrics {
	/// Returns how many loads were served from a cache.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Returns how many loads went to the gateway.
	pub fn misses(&self) -> u64 {
		self.misses.load(Ordering::Relaxed)
	}

	/// Returns how many gateway loads failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_miss(&self) {
		self.misses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
