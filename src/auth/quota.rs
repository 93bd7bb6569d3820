//! Process-lifetime quota for unauthenticated requests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// Counts guest requests against a fixed limit.
///
/// The counter only moves forward: every guest attempt is counted, including the ones that end
/// up rejected, and nothing short of dropping the quota resets it.
#[derive(Debug)]
pub struct GuestQuota {
	count: AtomicU64,
	limit: u64,
}
impl GuestQuota {
	/// Creates a quota allowing `limit` guest requests.
	pub fn new(limit: u64) -> Self {
		Self { count: AtomicU64::new(0), limit }
	}

	/// Counts one guest attempt and rejects it when the new count exceeds the limit.
	pub fn try_acquire(&self) -> Result<u64> {
		let count = self.count.fetch_add(1, Ordering::Relaxed).saturating_add(1);

		if count > self.limit {
			return Err(Error::QuotaExceeded { limit: self.limit });
		}

		Ok(count)
	}

	/// Returns the number of guest attempts counted so far.
	pub fn count(&self) -> u64 {
		self.count.load(Ordering::Relaxed)
	}

	/// Returns the configured limit.
	pub fn limit(&self) -> u64 {
		self.limit
	}

	/// Returns how many guest requests remain before local rejection.
	pub fn remaining(&self) -> u64 {
		self.limit.saturating_sub(self.count())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rejects_the_request_after_the_limit() {
		let quota = GuestQuota::new(2);

		assert_eq!(quota.try_acquire().expect("First guest request should pass."), 1);
		assert_eq!(quota.try_acquire().expect("Second guest request should pass."), 2);
		assert_eq!(quota.remaining(), 0);

		let err = quota.try_acquire().expect_err("Third guest request should be rejected.");

		assert!(matches!(err, Error::QuotaExceeded { limit: 2 }));
	}

	#[test]
	fn rejected_attempts_still_count() {
		let quota = GuestQuota::new(1);
		let _ = quota.try_acquire();
		let _ = quota.try_acquire();
		let _ = quota.try_acquire();

		assert_eq!(quota.count(), 3);
		assert_eq!(quota.remaining(), 0);
		assert_eq!(quota.limit(), 1);
	}
}
