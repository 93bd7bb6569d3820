//! Account lifecycle on top of [`AuthenticatedTransport`]: registration, login, token refresh,
//! current-user lookup, sign-out, and captcha verification.
//!
//! Registration, login, and captcha verification are exempt from the guest quota so a guest who
//! spent it can still authenticate.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret, UserProfile},
	gateway::Envelope,
	http::ApiHttpClient,
	obs::{self, OperationKind},
	transport::{ApiRequest, AuthenticatedTransport, ReauthEvent, ReauthReason},
};

const REGISTER_FAILED: &str = "Registration failed.";
const LOGIN_FAILED: &str = "Login failed.";
const REFRESH_FAILED: &str = "Token refresh failed.";
const CAPTCHA_FAILED: &str = "Captcha verification failed.";

/// Username and password submitted to `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	/// Login name.
	pub username: String,
	/// Plain-text password.
	pub password: String,
	/// Extra fields such as a solved captcha token.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Credentials {
	/// Creates credentials without extra fields.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: password.into(), extra: Map::new() }
	}

	/// Adds an extra field to the login payload.
	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish_non_exhaustive()
	}
}

/// Payload submitted to `POST /auth/register`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
	/// Desired login name.
	pub username: String,
	/// Plain-text password.
	pub password: String,
	/// Contact address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Extra fields the service accepts.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Registration {
	/// Creates a registration payload.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: password.into(), email: None, extra: Map::new() }
	}

	/// Sets the contact address.
	pub fn email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}
}
impl Debug for Registration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Registration")
			.field("username", &self.username)
			.field("email", &self.email)
			.finish_non_exhaustive()
	}
}

/// Free-form captcha answer submitted to `POST /auth/captcha`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptchaAnswer {
	/// Fields understood by the captcha endpoint.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}
impl CaptchaAnswer {
	/// Adds one field.
	pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(key.into(), value.into());

		self
	}
}

/// `data` payload of a login response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LoginGrant {
	/// Issued bearer token.
	pub token: Option<TokenSecret>,
	/// Signed-in user.
	pub user: Option<UserProfile>,
}

/// Successful reply of an account endpoint that returns no typed payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountReply {
	/// Service message, if any.
	pub message: Option<String>,
	/// Raw payload, if any.
	pub data: Option<Value>,
}

#[derive(Deserialize)]
struct RefreshData {
	token: Option<TokenSecret>,
}

impl<C> AuthenticatedTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// `POST /auth/register`.
	pub async fn register(&self, registration: &Registration) -> Result<AccountReply> {
		let request = ApiRequest::post(OperationKind::Register, ["auth", "register"])
			.quota_exempt()
			.serialize_body(registration)?;

		self.account_reply(request, REGISTER_FAILED).await
	}

	/// `POST /auth/login`. When the service issues a token, the token and user profile replace
	/// the stored session.
	pub async fn login(&self, credentials: &Credentials) -> Result<LoginGrant> {
		let request = ApiRequest::post(OperationKind::Login, ["auth", "login"])
			.quota_exempt()
			.serialize_body(credentials)?;
		let grant = self
			.send::<Envelope<Value>>(request)
			.await?
			.decode::<LoginGrant>()?
			.into_result(LOGIN_FAILED)?
			.unwrap_or_default();

		if let Some(token) = &grant.token {
			let session = Session { token: Some(token.clone()), user: grant.user.clone() };

			self.session.save(session).await?;
		}

		Ok(grant)
	}

	/// `POST /auth/refresh` with the current token.
	///
	/// On success the stored token is replaced (or kept when the service issues none) and the
	/// effective token is returned. On any failure the session is cleared, the reauth handler is
	/// notified, and [`Error::RefreshFailed`] is returned; the old token must not be reused.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		let Some(current) = self.session.load().await?.token else {
			let cause = Error::RefreshFailed { reason: "no session token to refresh".into() };

			return Err(self.fail_refresh(cause).await);
		};

		match self.request_refresh(&current).await {
			Ok(Some(issued)) => {
				self.session.replace_token(issued.clone()).await?;

				Ok(issued)
			},
			Ok(None) => Ok(current),
			Err(e) => Err(self.fail_refresh(e).await),
		}
	}

	/// `GET /auth/me`. Returns `None` without dispatching when no token is stored; any failure
	/// signs the user out and also yields `None`.
	pub async fn current_user(&self) -> Result<Option<UserProfile>> {
		if !self.session.load().await?.is_registered() {
			return Ok(None);
		}

		let request = ApiRequest::get(OperationKind::CurrentUser, ["auth", "me"]);
		let result = self
			.send::<Envelope<Value>>(request)
			.await
			.and_then(|envelope| envelope.decode::<UserProfile>())
			.and_then(|envelope| envelope.into_data("Current user is unavailable."));

		match result {
			Ok(user) => Ok(Some(user)),
			// A 401 has already cleared the session and raised its own event.
			Err(Error::Unauthorized) => Ok(None),
			Err(_) => {
				self.logout().await?;

				Ok(None)
			},
		}
	}

	/// Clears the session and notifies the reauth handler with [`ReauthReason::SignedOut`].
	pub async fn logout(&self) -> Result<()> {
		self.session.clear().await?;
		self.notify(ReauthEvent::new(ReauthReason::SignedOut));

		Ok(())
	}

	/// `POST /auth/captcha`.
	pub async fn verify_captcha(&self, answer: &CaptchaAnswer) -> Result<AccountReply> {
		let request = ApiRequest::post(OperationKind::Captcha, ["auth", "captcha"])
			.quota_exempt()
			.serialize_body(answer)?;

		self.account_reply(request, CAPTCHA_FAILED).await
	}

	/// Returns the stored token, if any.
	pub async fn token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.session.load().await?.token)
	}

	/// Returns `true` when a token is stored.
	pub async fn is_signed_in(&self) -> Result<bool> {
		Ok(self.session.load().await?.is_registered())
	}

	async fn request_refresh(&self, token: &TokenSecret) -> Result<Option<TokenSecret>> {
		let request = ApiRequest::post(OperationKind::Refresh, ["auth", "refresh"])
			.json_body(json!({ "token": token.expose() }));
		let data = self
			.send::<Envelope<Value>>(request)
			.await?
			.decode::<RefreshData>()?
			.into_result(REFRESH_FAILED)?;

		Ok(data.and_then(|data| data.token))
	}

	async fn fail_refresh(&self, cause: Error) -> Error {
		// A 401 has already cleared the session and raised its own event.
		let notified = matches!(cause, Error::Unauthorized);

		if let Err(e) = self.session.clear().await {
			obs::log_failure(OperationKind::Refresh, &e);
		}
		if !notified {
			self.notify(ReauthEvent::new(ReauthReason::RefreshFailed).with_path("/auth/refresh"));
		}

		match cause {
			Error::RefreshFailed { .. } => cause,
			other => Error::RefreshFailed { reason: other.to_string() },
		}
	}

	async fn account_reply(&self, request: ApiRequest, fallback: &str) -> Result<AccountReply> {
		let envelope = self.send::<Envelope<Value>>(request).await?;
		let message = envelope.message.clone();
		let data = envelope.into_result(fallback)?;

		Ok(AccountReply { message, data })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_serialize_flat_and_debug_redacted() {
		let credentials = Credentials::new("alice", "hunter2").with_field("captcha", "x9");
		let value = serde_json::to_value(&credentials).expect("Credentials should serialize.");

		assert_eq!(value, json!({ "username": "alice", "password": "hunter2", "captcha": "x9" }));
		assert!(!format!("{credentials:?}").contains("hunter2"));
	}

	#[test]
	fn registration_omits_absent_email() {
		let value = serde_json::to_value(Registration::new("bob", "pw"))
			.expect("Registration should serialize.");

		assert_eq!(value, json!({ "username": "bob", "password": "pw" }));

		let value = serde_json::to_value(Registration::new("bob", "pw").email("bob@example.com"))
			.expect("Registration should serialize.");

		assert_eq!(value["email"], json!("bob@example.com"));
	}
}
