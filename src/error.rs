//! Client-level error types shared by the transport, gateway, account, and store layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A successful response body could not be decoded into the expected shape.
	#[error("Response body from HTTP {status} could not be decoded.")]
	Decode {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the undecodable response.
		status: u16,
	},

	/// The guest request quota is spent; the request was rejected before dispatch.
	#[error("Guest request quota of {limit} is exhausted; sign in to continue.")]
	QuotaExceeded {
		/// Configured guest limit.
		limit: u64,
	},
	/// The remote rejected the session (HTTP 401); the session has been cleared.
	#[error("Session is invalid or expired.")]
	Unauthorized,
	/// The remote rejected the signature or the caller's authorization (HTTP 403).
	#[error("Request was forbidden: {message}.")]
	Forbidden {
		/// Remote- or client-supplied message.
		message: String,
	},
	/// The remote rate-limited the caller (HTTP 429); retry with backoff.
	#[error("Request was rate limited: {message}.")]
	RateLimited {
		/// Remote- or client-supplied message.
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Any other non-2xx response.
	#[error("Request failed with HTTP {status}: {message}.")]
	RequestFailed {
		/// HTTP status code.
		status: u16,
		/// Remote- or client-supplied message.
		message: String,
	},
	/// The response envelope reported `success = false`.
	#[error("{message}")]
	Remote {
		/// Envelope message, or a per-operation fallback.
		message: String,
	},
	/// The requested question does not exist remotely.
	#[error("Question `{id}` was not found.")]
	NotFound {
		/// Identifier that was looked up.
		id: String,
	},
	/// Token refresh was rejected; the session has been cleared.
	#[error("Token refresh failed: {reason}.")]
	RefreshFailed {
		/// Underlying failure summary.
		reason: String,
	},
}
impl Error {
	/// Returns the HTTP status associated with the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Decode { status, .. } | Self::RequestFailed { status, .. } => Some(*status),
			Self::Unauthorized => Some(401),
			Self::Forbidden { .. } => Some(403),
			Self::RateLimited { .. } => Some(429),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed (invalid header value, URI, etc.).
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	EncodeBody(#[source] serde_json::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL must use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Base URL must not carry a query string or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasQuery {
		/// Offending URL.
		url: String,
	},
	/// Guest limit must allow at least one request.
	#[error("The guest limit must be at least 1.")]
	ZeroGuestLimit,
	/// Page size must be at least one.
	#[error("The page size must be at least 1.")]
	ZeroPageSize,
	/// Request timeout must be positive.
	#[error("The request timeout must be positive.")]
	ZeroTimeout,
	/// Environment variable holds an unusable value.
	#[error("Environment variable `{name}` holds an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Raw value.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the question service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The transport's fixed request timeout elapsed.
	#[error("Request to the question service timed out.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the question service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
