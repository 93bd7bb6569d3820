//! Re-authentication hook raised when the session stops being usable.

// self
use crate::_prelude::*;

/// Why the host should send the user back to authentication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReauthReason {
	/// The service answered HTTP 401; the session was cleared.
	Unauthorized,
	/// Token refresh failed; the session was cleared.
	RefreshFailed,
	/// The user signed out.
	SignedOut,
}
impl ReauthReason {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ReauthReason::Unauthorized => "unauthorized",
			ReauthReason::RefreshFailed => "refresh_failed",
			ReauthReason::SignedOut => "signed_out",
		}
	}
}
impl Display for ReauthReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Event delivered to the host's [`ReauthHandler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReauthEvent {
	/// Trigger.
	pub reason: ReauthReason,
	/// Request path that triggered the event; `None` for explicit sign-out.
	pub path: Option<String>,
	/// When the event was raised.
	pub occurred_at: OffsetDateTime,
}
impl ReauthEvent {
	/// Creates an event stamped with the current time.
	pub fn new(reason: ReauthReason) -> Self {
		Self { reason, path: None, occurred_at: OffsetDateTime::now_utc() }
	}

	/// Records the request path that triggered the event.
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());

		self
	}
}

/// Host-side hook deciding how to bring the user back to an authentication entry point.
///
/// The transport never navigates on its own; it clears the session and calls the handler.
/// Closures taking `&ReauthEvent` implement the trait directly.
pub trait ReauthHandler
where
	Self: Send + Sync,
{
	/// Called once per event.
	fn reauth_required(&self, event: &ReauthEvent);
}
impl<F> ReauthHandler for F
where
	F: Fn(&ReauthEvent) + Send + Sync,
{
	fn reauth_required(&self, event: &ReauthEvent) {
		self(event)
	}
}
