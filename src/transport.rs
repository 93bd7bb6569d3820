//! Authenticated transport: the single choke point for every outbound call.
//!
//! Each request is decorated in a fixed order before dispatch:
//!
//! 1. the session is read; guests spend one unit of [`GuestQuota`] and are rejected locally
//!    with [`Error::QuotaExceeded`] once the limit is passed,
//! 2. registered callers get `Authorization: Bearer <token>`,
//! 3. query and body parameters are merged, signed, and attached as [`SIGN_HEADER`] and
//!    [`TIMESTAMP_HEADER`],
//! 4. the caller class is attached as [`USER_TYPE_HEADER`].
//!
//! Responses are classified into the crate's [`Error`] taxonomy. A 401 clears the session and
//! notifies the host's [`ReauthHandler`] exactly once; nothing is retried automatically.

mod metrics;
pub mod reauth;
pub mod request;

pub use metrics::TransportMetrics;
pub use reauth::*;
pub use request::*;

// crates.io
use ::http::{
	StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{CallerClass, GuestQuota, TokenSecret},
	config::ClientConfig,
	error::ConfigError,
	http::{ApiHttpClient, HttpRequest, HttpResponse, parse_retry_after},
	obs::{self, OperationOutcome, OperationSpan},
	sign::RequestSigner,
	store::SessionStore,
};

/// Header carrying the request signature.
pub const SIGN_HEADER: &str = "X-Tiku-Sign";
/// Header carrying the millisecond timestamp bound into the signature.
pub const TIMESTAMP_HEADER: &str = "X-Tiku-Timestamp";
/// Header carrying the caller class (`registered` or `guest`).
pub const USER_TYPE_HEADER: &str = "X-User-Type";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Decorates, dispatches, and classifies calls to the question service.
///
/// The transport owns the guest quota and the reauth hook; the session lives behind a
/// [`SessionStore`] shared with the account flows. Wrap it in an [`Arc`] and hand it to every
/// gateway that should share the same quota.
pub struct AuthenticatedTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client used for every dispatch.
	pub http_client: Arc<C>,
	/// Session backend read on every call.
	pub session: Arc<dyn SessionStore>,
	/// Transport counters.
	pub metrics: Arc<TransportMetrics>,
	signer: RequestSigner,
	base_url: Url,
	quota: Arc<GuestQuota>,
	reauth: Option<Arc<dyn ReauthHandler>>,
}
impl<C> AuthenticatedTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a transport around a caller-supplied HTTP client.
	pub fn with_http_client(
		config: &ClientConfig,
		session: Arc<dyn SessionStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			session,
			metrics: Default::default(),
			signer: RequestSigner::from_config(config),
			base_url: config.base_url.clone(),
			quota: Arc::new(GuestQuota::new(config.guest_limit)),
			reauth: None,
		}
	}

	/// Installs the hook notified when the user must authenticate again.
	pub fn with_reauth_handler(mut self, handler: Arc<dyn ReauthHandler>) -> Self {
		self.reauth = Some(handler);

		self
	}

	/// Returns the service root.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Returns the guest quota shared by every request of this transport.
	pub fn quota(&self) -> &GuestQuota {
		&self.quota
	}

	/// Returns the request signer.
	pub fn signer(&self) -> &RequestSigner {
		&self.signer
	}

	/// Decorates and dispatches `request`, decoding a 2xx body into `T`.
	pub async fn send<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let kind = request.operation;
		let span = OperationSpan::new(kind, "send");

		obs::record_outcome(kind, OperationOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		match &result {
			Ok(_) => obs::record_outcome(kind, OperationOutcome::Success),
			Err(e) => {
				obs::record_outcome(kind, OperationOutcome::Failure);
				obs::log_failure(kind, e);
			},
		}

		result
	}

	pub(crate) fn notify(&self, event: ReauthEvent) {
		obs::log_reauth(event.reason.as_str(), event.path.as_deref().unwrap_or_default());

		if let Some(handler) = &self.reauth {
			handler.reauth_required(&event);
		}
	}

	async fn dispatch<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let session = self.session.load().await?;
		let caller = session.caller_class();

		if caller == CallerClass::Guest && !request.quota_exempt {
			self.quota.try_acquire().inspect_err(|_| self.metrics.record_quota_rejection())?;
		}

		let http_request = self.build_request(&request, session.token.as_ref(), caller)?;

		self.metrics.record_dispatch();

		let response = self
			.http_client
			.execute(http_request)
			.await
			.map_err(|e| self.http_client.map_transport_error(e))?;

		if response.status().is_success() {
			return decode_body(response.status(), response.body());
		}

		Err(self.classify_failure(&request, &response).await)
	}

	fn build_request(
		&self,
		request: &ApiRequest,
		token: Option<&TokenSecret>,
		caller: CallerClass,
	) -> Result<HttpRequest> {
		let url = self.endpoint(request)?;
		let mut builder = ::http::Request::builder()
			.method(request.method.clone())
			.uri(url.as_str())
			.header(CONTENT_TYPE, JSON_CONTENT_TYPE);

		if let Some(token) = token {
			builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.expose()));
		}

		let signature = self.signer.sign(&request.combined_params());

		if signature.is_available() {
			builder = builder.header(SIGN_HEADER, signature.value.as_str());
		} else {
			obs::log_event(request.operation, "signing unavailable, request goes out unsigned");
		}

		let http_request = builder
			.header(TIMESTAMP_HEADER, signature.timestamp.to_string())
			.header(USER_TYPE_HEADER, caller.as_str())
			.body(request.body_bytes()?)
			.map_err(ConfigError::from)?;

		Ok(http_request)
	}

	fn endpoint(&self, request: &ApiRequest) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::UnsupportedScheme { url: self.base_url.to_string() })?
			.pop_if_empty()
			.extend(request.segments.iter());

		if !request.query.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (key, value) in &request.query {
				pairs.append_pair(key, value);
			}
		}

		Ok(url)
	}

	async fn classify_failure(&self, request: &ApiRequest, response: &HttpResponse) -> Error {
		let status = response.status();
		let message = failure_message(status, response.body());

		match status {
			StatusCode::UNAUTHORIZED => {
				self.metrics.record_unauthorized();

				if let Err(e) = self.session.clear().await {
					obs::log_failure(request.operation, &e);
				}

				self.notify(ReauthEvent::new(ReauthReason::Unauthorized).with_path(request.path()));

				Error::Unauthorized
			},
			StatusCode::FORBIDDEN => Error::Forbidden { message },
			StatusCode::TOO_MANY_REQUESTS =>
				Error::RateLimited { message, retry_after: parse_retry_after(response.headers()) },
			_ => Error::RequestFailed { status: status.as_u16(), message },
		}
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticatedTransport<ReqwestHttpClient> {
	/// Creates a transport backed by reqwest with the configured request timeout.
	pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(config)?;

		Ok(Self::with_http_client(config, session, http_client))
	}
}
impl<C> Debug for AuthenticatedTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedTransport")
			.field("base_url", &self.base_url.as_str())
			.field("quota", &self.quota)
			.field("signer", &self.signer)
			.field("reauth_handler", &self.reauth.is_some())
			.finish_non_exhaustive()
	}
}

#[derive(Deserialize)]
struct FailureBody {
	message: Option<String>,
	error: Option<String>,
}

fn decode_body<T>(status: StatusCode, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { source, status: status.as_u16() })
}

fn failure_message(status: StatusCode, body: &[u8]) -> String {
	serde_json::from_slice::<FailureBody>(body)
		.ok()
		.and_then(|body| {
			[body.message, body.error].into_iter().flatten().find(|text| !text.trim().is_empty())
		})
		.unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_owned())
}
