//! Client configuration: service location, transport bounds, guest quota, and signing material.

// std
use std::{env, time::Duration as StdDuration};
// self
use crate::{_prelude::*, error::ConfigError};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "TIKU_API_URL";
/// Environment variable overriding the guest limit.
pub const GUEST_LIMIT_ENV: &str = "TIKU_GUEST_LIMIT";
/// Default number of unauthenticated requests allowed per transport lifetime.
pub const DEFAULT_GUEST_LIMIT: u64 = 10;
/// Default page size for list and search queries.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Fixed per-request timeout applied by the default transport.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// Key material embedded in every distributed client.
pub const DEFAULT_SIGNING_KEY: &str = "tiku_secure_key_2025";
/// IV material embedded in every distributed client.
pub const DEFAULT_SIGNING_IV: &str = "tiku_secure_iv_25";

/// Validated client configuration consumed by the transport and the cache store.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
	/// Service root; endpoint paths are appended to it.
	pub base_url: Url,
	/// Fixed request timeout for the default transport.
	pub request_timeout: StdDuration,
	/// Guest requests permitted before local rejection.
	pub guest_limit: u64,
	/// Initial page size of the cache store.
	pub page_size: u32,
	/// Identity string folded into every signature.
	pub client_identity: String,
	/// Raw signing key material.
	pub signing_key: Vec<u8>,
	/// Raw signing IV material.
	pub signing_iv: Vec<u8>,
}
impl ClientConfig {
	/// Creates a new builder seeded with defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Builds a configuration from `TIKU_API_URL` and `TIKU_GUEST_LIMIT`, falling back to
	/// defaults for anything unset.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut builder = Self::builder();

		if let Ok(raw) = env::var(BASE_URL_ENV) {
			builder = builder.base_url_str(&raw)?;
		}
		if let Ok(raw) = env::var(GUEST_LIMIT_ENV) {
			let limit = raw
				.trim()
				.parse::<u64>()
				.map_err(|_| ConfigError::InvalidEnv { name: GUEST_LIMIT_ENV, value: raw.clone() })?;

			builder = builder.guest_limit(limit);
		}

		builder.build()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
			return Err(ConfigError::BaseUrlHasQuery { url: self.base_url.to_string() });
		}
		if self.guest_limit == 0 {
			return Err(ConfigError::ZeroGuestLimit);
		}
		if self.page_size == 0 {
			return Err(ConfigError::ZeroPageSize);
		}
		if self.request_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(())
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		ClientConfigBuilder::default().into_config()
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("base_url", &self.base_url.as_str())
			.field("request_timeout", &self.request_timeout)
			.field("guest_limit", &self.guest_limit)
			.field("page_size", &self.page_size)
			.field("client_identity", &self.client_identity)
			.finish_non_exhaustive()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	base_url: Url,
	request_timeout: StdDuration,
	guest_limit: u64,
	page_size: u32,
	client_identity: String,
	signing_key: Vec<u8>,
	signing_iv: Vec<u8>,
}
impl ClientConfigBuilder {
	/// Sets the service root.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = url;

		self
	}

	/// Parses and sets the service root.
	pub fn base_url_str(self, raw: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Ok(self.base_url(url))
	}

	/// Overrides the fixed request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the guest request limit.
	pub fn guest_limit(mut self, limit: u64) -> Self {
		self.guest_limit = limit;

		self
	}

	/// Overrides the initial page size.
	pub fn page_size(mut self, size: u32) -> Self {
		self.page_size = size;

		self
	}

	/// Overrides the identity string folded into signatures.
	pub fn client_identity(mut self, identity: impl Into<String>) -> Self {
		self.client_identity = identity.into();

		self
	}

	/// Overrides the signing key and IV material.
	pub fn signing_material(mut self, key: impl AsRef<[u8]>, iv: impl AsRef<[u8]>) -> Self {
		self.signing_key = key.as_ref().to_vec();
		self.signing_iv = iv.as_ref().to_vec();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = self.into_config();

		config.validate()?;

		Ok(config)
	}

	fn into_config(self) -> ClientConfig {
		ClientConfig {
			base_url: self.base_url,
			request_timeout: self.request_timeout,
			guest_limit: self.guest_limit,
			page_size: self.page_size,
			client_identity: self.client_identity,
			signing_key: self.signing_key,
			signing_iv: self.signing_iv,
		}
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			guest_limit: DEFAULT_GUEST_LIMIT,
			page_size: DEFAULT_PAGE_SIZE,
			client_identity: concat!("tiku-client/", env!("CARGO_PKG_VERSION")).into(),
			signing_key: DEFAULT_SIGNING_KEY.as_bytes().to_vec(),
			signing_iv: DEFAULT_SIGNING_IV.as_bytes().to_vec(),
		}
	}
}

fn default_base_url() -> Url {
	match Url::parse(DEFAULT_BASE_URL) {
		Ok(url) => url,
		Err(e) => unreachable!("DEFAULT_BASE_URL is a valid URL literal: {e}"),
	}
}
