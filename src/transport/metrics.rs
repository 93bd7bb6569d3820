// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for transport activity.
#[derive(Debug, Default)]
pub struct TransportMetrics {
	dispatched: AtomicU64,
	quota_rejections: AtomicU64,
	unauthorized: AtomicU64,
}
impl TransportMetrics {
	/// Returns the number of requests handed to the HTTP client.
	pub fn dispatched(&self) -> u64 {
		self.dispatched.load(Ordering::Relaxed)
	}

	/// Returns the number of guest requests rejected locally.
	pub fn quota_rejections(&self) -> u64 {
		self.quota_rejections.load(Ordering::Relaxed)
	}

	/// Returns the number of HTTP 401 responses observed.
	pub fn unauthorized(&self) -> u64 {
		self.unauthorized.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatched.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_quota_rejection(&self) {
		self.quota_rejections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_unauthorized(&self) {
		self.unauthorized.fetch_add(1, Ordering::Relaxed);
	}
}
