//! Session state: the bearer token plus the cached user profile.

// self
use crate::_prelude::*;

/// Redacted token wrapper keeping bearer secrets out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Profile of the signed-in user as reported by the auth endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Remote user identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Login name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Contact address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Any further fields the service includes.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Which class of caller a request is issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallerClass {
	/// A bearer token is attached.
	Registered,
	/// No bearer token; the request counts against the guest quota.
	Guest,
}
impl CallerClass {
	/// Returns the `X-User-Type` header value.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallerClass::Registered => "registered",
			CallerClass::Guest => "guest",
		}
	}
}
impl Display for CallerClass {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Persisted session. A present token means a registered caller; absence means a guest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
	/// Bearer token, stored under the `auth_token` key.
	#[serde(rename = "auth_token", default, skip_serializing_if = "Option::is_none")]
	pub token: Option<TokenSecret>,
	/// User profile, stored under the `user` key.
	#[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
	pub user: Option<UserProfile>,
}
impl Session {
	/// Creates a session holding only a token.
	pub fn with_token(token: impl Into<String>) -> Self {
		Self { token: Some(TokenSecret::new(token)), user: None }
	}

	/// Attaches a user profile.
	pub fn with_user(mut self, user: UserProfile) -> Self {
		self.user = Some(user);

		self
	}

	/// Returns the caller class implied by the token's presence.
	pub fn caller_class(&self) -> CallerClass {
		if self.token.is_some() { CallerClass::Registered } else { CallerClass::Guest }
	}

	/// Returns `true` when a token is present.
	pub fn is_registered(&self) -> bool {
		self.token.is_some()
	}
}
