//! Transport primitives for calls to the question service.
//!
//! [`ApiHttpClient`] is the crate's only dependency on an HTTP stack. The authenticated
//! transport builds fully-decorated [`HttpRequest`] values and hands them to an implementation;
//! the implementation returns the raw [`HttpResponse`] whatever its status, leaving
//! classification to the caller. Only failures that produced no HTTP response at all (DNS,
//! TLS, timeouts) travel through [`ApiHttpClient::TransportError`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use ::http::{HeaderMap, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::{config::ClientConfig, error::ConfigError};

/// Fully-decorated outbound request.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Raw response as returned by the transport.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports able to dispatch question-service requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared across
/// gateways and stores, and the futures they return must be `Send` so callers can box them.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Dispatches `request` and resolves with the response, whatever its status code.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;

	/// Converts a transport failure into a client [`Error`].
	fn map_transport_error(&self, error: Self::TransportError) -> Error {
		TransportError::network(error).into()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose every request is bounded by `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}

	/// Builds a client from the configured request timeout.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		Self::with_timeout(config.request_timeout)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}

	fn map_transport_error(&self, error: ReqwestError) -> Error {
		if error.is_builder() {
			return ConfigError::from(error).into();
		}
		if error.is_timeout() {
			return TransportError::Timeout.into();
		}

		TransportError::network(error).into()
	}
}

/// Parses a `Retry-After` header given either as delta-seconds or as an RFC 2822 date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use ::http::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static(" 12 "));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(12)));
	}

	#[test]
	fn retry_after_ignores_past_dates_and_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 +0000"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}
}
