//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `tiku_client.operation` with the
//!   `operation` and `stage` fields, plus `warn` events for failed operations.
//! - Enable `metrics` to increment the `tiku_client_operation_total` counter for every
//!   attempt/success/failure/cache hit, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Remote operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Paginated, filtered list.
	List,
	/// Single question lookup.
	Detail,
	/// Keyword search.
	Search,
	/// Category listing.
	Categories,
	/// Aggregate statistics.
	Stats,
	/// Batch lookup by ids.
	Batch,
	/// Account registration.
	Register,
	/// Credential login.
	Login,
	/// Token refresh.
	Refresh,
	/// Current-user lookup.
	CurrentUser,
	/// Captcha verification.
	Captcha,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::List => "list",
			OperationKind::Detail => "detail",
			OperationKind::Search => "search",
			OperationKind::Categories => "categories",
			OperationKind::Stats => "stats",
			OperationKind::Batch => "batch",
			OperationKind::Register => "register",
			OperationKind::Login => "login",
			OperationKind::Refresh => "refresh",
			OperationKind::CurrentUser => "current_user",
			OperationKind::Captcha => "captcha",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// A request is about to be dispatched.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Served from a cache without touching the network.
	CacheHit,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
			OperationOutcome::CacheHit => "cache_hit",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
