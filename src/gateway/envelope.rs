//! Wire shapes shared by every endpoint.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	question::{Question, RawQuestion},
};

/// Uniform `{ success, data, message?, error? }` wrapper around every response.
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope<T> {
	/// Whether the service considers the call successful.
	#[serde(default)]
	pub success: bool,
	/// Payload; may be absent on failure.
	pub data: Option<T>,
	/// Human-readable message.
	pub message: Option<String>,
	/// Error detail some endpoints use instead of `message`.
	pub error: Option<String>,
}
impl<T> Envelope<T> {
	/// Returns the payload, or [`Error::Remote`] carrying the envelope message (or `fallback`)
	/// when the service reported failure.
	pub fn into_result(self, fallback: &str) -> Result<Option<T>> {
		if self.success {
			return Ok(self.data);
		}

		Err(Error::Remote { message: self.failure_message(fallback) })
	}

	/// Like [`Envelope::into_result`], but a successful envelope without `data` is a failure too.
	pub fn into_data(self, fallback: &str) -> Result<T> {
		self.into_result(fallback)?.ok_or_else(|| Error::Remote { message: fallback.to_owned() })
	}

	/// Picks the first non-blank of `message` and `error`, or `fallback`.
	pub fn failure_message(&self, fallback: &str) -> String {
		[self.message.as_deref(), self.error.as_deref()]
			.into_iter()
			.flatten()
			.find(|text| !text.trim().is_empty())
			.unwrap_or(fallback)
			.to_owned()
	}
}

impl Envelope<Value> {
	/// Checks `success` before decoding `data` into `T`.
	///
	/// A failure envelope keeps its message and drops its payload whatever shape the payload
	/// has. Envelopes only reach callers from 2xx responses, so a payload that fails to decode
	/// is reported against HTTP 200.
	pub fn decode<T>(self) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
	{
		let data = match self.data {
			Some(data) if self.success => Some(
				serde_path_to_error::deserialize(data)
					.map_err(|source| Error::Decode { source, status: 200 })?,
			),
			_ => None,
		};

		Ok(Envelope { success: self.success, data, message: self.message, error: self.error })
	}
}

/// Pagination block nested in list responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
	/// Page echoed by the service.
	pub page: u32,
	/// Page size echoed by the service.
	pub page_size: u32,
	/// Total matching records.
	pub total: u64,
	/// Page count computed by the service.
	pub total_pages: u64,
}

/// `data` payload of list and search responses.
#[derive(Clone, Debug, Deserialize)]
pub struct ListData {
	/// Raw records in service order.
	#[serde(default)]
	pub questions: Vec<RawQuestion>,
	/// Pagination block; when absent, the total falls back to the record count.
	pub pagination: Option<PageInfo>,
}

/// `data` payload of batch responses: either a bare array or a list-shaped object.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum BatchData {
	/// Bare array of records.
	Records(Vec<RawQuestion>),
	/// `{ questions: [...] }` object.
	Wrapped(ListData),
}
impl BatchData {
	/// Returns the raw records regardless of shape.
	pub fn into_records(self) -> Vec<RawQuestion> {
		match self {
			BatchData::Records(records) => records,
			BatchData::Wrapped(data) => data.questions,
		}
	}
}

/// One page of normalized questions plus the reported total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionPage {
	/// Questions in service order, every one with a populated id.
	pub questions: Vec<Question>,
	/// Total matching records across all pages.
	pub total: u64,
}

/// Aggregate statistics; the service decides which fields exist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
	/// Every field of the stats payload.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}
impl QuestionStats {
	/// Returns a field by name.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Returns a numeric field by name.
	pub fn count(&self, key: &str) -> Option<u64> {
		self.get(key).and_then(Value::as_u64)
	}
}
