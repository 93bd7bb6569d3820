//! Timestamp-bound request signatures.
//!
//! A signature is the AES-CBC (PKCS7) encryption of `identity|timestamp|params-json`, Base64
//! encoded. The key and IV ship inside every client, so the scheme only deters casual request
//! forgery and bots; it is not an authentication mechanism and must not be treated as one.
//! Freshness comes from the millisecond timestamp: the same parameters signed at two different
//! instants produce two different signatures.

// std
use std::collections::BTreeMap;
// crates.io
use aes::Aes256;
use base64::{Engine, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
// self
use crate::{_prelude::*, config::ClientConfig};

type SignCipher = cbc::Encryptor<Aes256>;

/// Separator placed between the plaintext components.
pub const SIGNATURE_DELIMITER: char = '|';

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Signature produced for one outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
	/// Base64 ciphertext; empty when signing was unavailable.
	pub value: String,
	/// Unix timestamp in milliseconds bound into the signature.
	pub timestamp: i64,
}
impl Signature {
	/// Returns `false` when signing failed and the request goes out unsigned.
	pub fn is_available(&self) -> bool {
		!self.value.is_empty()
	}
}

/// Why a signature could not be produced. Never fatal to the request itself.
#[derive(Debug, ThisError)]
pub enum SigningUnavailable {
	/// Parameters could not be serialized.
	#[error("Request parameters could not be serialized for signing.")]
	Serialize(#[from] serde_json::Error),
	/// The cipher rejected the key or IV.
	#[error("Signing cipher could not be initialized.")]
	Cipher,
}

/// Produces deterministic signatures for a fixed identity, key, and IV.
#[derive(Clone)]
pub struct RequestSigner {
	identity: String,
	key: [u8; KEY_LEN],
	iv: [u8; IV_LEN],
}
impl RequestSigner {
	/// Creates a signer. Key material is fitted to 32 bytes and IV material to 16 bytes by
	/// truncating longer input and zero-padding shorter input.
	pub fn new(identity: impl Into<String>, key: impl AsRef<[u8]>, iv: impl AsRef<[u8]>) -> Self {
		Self { identity: identity.into(), key: fit(key.as_ref()), iv: fit(iv.as_ref()) }
	}

	/// Creates a signer from the configured identity and signing material.
	pub fn from_config(config: &ClientConfig) -> Self {
		Self::new(&config.client_identity, &config.signing_key, &config.signing_iv)
	}

	/// Returns the identity folded into every plaintext.
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// Signs `params` at the current wall-clock time.
	pub fn sign(&self, params: &Map<String, Value>) -> Signature {
		self.sign_at(params, now_millis())
	}

	/// Signs `params` at `timestamp`; an unavailable signature degrades to an empty value.
	pub fn sign_at(&self, params: &Map<String, Value>, timestamp: i64) -> Signature {
		let value = self.try_sign(params, timestamp).unwrap_or_default();

		Signature { value, timestamp }
	}

	/// Signs `params` at `timestamp`, reporting why signing was unavailable.
	pub fn try_sign(
		&self,
		params: &Map<String, Value>,
		timestamp: i64,
	) -> Result<String, SigningUnavailable> {
		let plaintext = self.plaintext(params, timestamp)?;
		let cipher = SignCipher::new_from_slices(&self.key, &self.iv)
			.map_err(|_| SigningUnavailable::Cipher)?;
		let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

		Ok(STANDARD.encode(ciphertext))
	}

	/// Builds the canonical plaintext. Top-level parameter keys are emitted in sorted order so
	/// the insertion order of the parameter map never changes the signature.
	pub fn plaintext(
		&self,
		params: &Map<String, Value>,
		timestamp: i64,
	) -> Result<String, serde_json::Error> {
		let ordered: BTreeMap<&String, &Value> = params.iter().collect();
		let json = serde_json::to_string(&ordered)?;

		Ok(format!(
			"{identity}{SIGNATURE_DELIMITER}{timestamp}{SIGNATURE_DELIMITER}{json}",
			identity = self.identity
		))
	}
}
impl Debug for RequestSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestSigner").field("identity", &self.identity).finish_non_exhaustive()
	}
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
	i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

fn fit<const N: usize>(material: &[u8]) -> [u8; N] {
	let mut out = [0_u8; N];
	let len = material.len().min(N);

	out[..len].copy_from_slice(&material[..len]);

	out
}
