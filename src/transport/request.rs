//! Transport-agnostic description of one outbound call.

// crates.io
use ::http::Method;
// self
use crate::{_prelude::*, error::ConfigError, obs::OperationKind};

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// Structured JSON, serialized at dispatch.
	Json(Value),
	/// Pre-serialized JSON text, sent verbatim.
	Text(String),
}

/// One outbound call before decoration: operation label, method, path, query, and body.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// Operation label used for spans, metrics, and reauth events.
	pub operation: OperationKind,
	/// HTTP method.
	pub method: Method,
	/// Path segments appended to the base URL; each one is percent-encoded.
	pub segments: Vec<String>,
	/// Query parameters in insertion order.
	pub query: Vec<(String, String)>,
	/// Optional payload.
	pub body: Option<RequestBody>,
	/// Exempts the request from the guest quota (account lifecycle calls).
	pub quota_exempt: bool,
}
impl ApiRequest {
	/// Creates a request for `segments` under the base URL.
	pub fn new<I, S>(operation: OperationKind, method: Method, segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			operation,
			method,
			segments: segments.into_iter().map(Into::into).collect(),
			query: Vec::new(),
			body: None,
			quota_exempt: false,
		}
	}

	/// Creates a `GET` request.
	pub fn get<I, S>(operation: OperationKind, segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(operation, Method::GET, segments)
	}

	/// Creates a `POST` request.
	pub fn post<I, S>(operation: OperationKind, segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(operation, Method::POST, segments)
	}

	/// Appends a query parameter; empty values are dropped.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		let value = value.to_string();

		if !value.is_empty() {
			self.query.push((key.into(), value));
		}

		self
	}

	/// Appends a query parameter only when `value` is present and non-empty.
	pub fn query_opt<V>(self, key: impl Into<String>, value: Option<V>) -> Self
	where
		V: ToString,
	{
		match value {
			Some(value) => self.query(key, value),
			None => self,
		}
	}

	/// Attaches a structured JSON body.
	pub fn json_body(mut self, body: Value) -> Self {
		self.body = Some(RequestBody::Json(body));

		self
	}

	/// Attaches pre-serialized JSON text as the body.
	pub fn text_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(RequestBody::Text(body.into()));

		self
	}

	/// Serializes `body` and attaches it.
	pub fn serialize_body<T>(self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let value = serde_json::to_value(body).map_err(ConfigError::EncodeBody)?;

		Ok(self.json_body(value))
	}

	/// Marks the request as exempt from the guest quota.
	pub fn quota_exempt(mut self) -> Self {
		self.quota_exempt = true;

		self
	}

	/// Returns the request path relative to the base URL, e.g. `/questions/search`.
	pub fn path(&self) -> String {
		format!("/{}", self.segments.join("/"))
	}

	/// Merges query parameters and top-level body fields into the parameter set that gets
	/// signed. Body fields win on key collisions; non-object bodies contribute nothing.
	pub fn combined_params(&self) -> Map<String, Value> {
		let mut params: Map<String, Value> =
			self.query.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();

		match &self.body {
			Some(RequestBody::Json(Value::Object(fields))) => params.extend(fields.clone()),
			Some(RequestBody::Text(raw)) =>
				if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(raw) {
					params.extend(fields);
				},
			_ => {},
		}

		params
	}

	/// Serializes the body for the wire.
	pub(crate) fn body_bytes(&self) -> Result<Vec<u8>> {
		match &self.body {
			Some(RequestBody::Json(value)) =>
				Ok(serde_json::to_vec(value).map_err(ConfigError::EncodeBody)?),
			Some(RequestBody::Text(raw)) => Ok(raw.as_bytes().to_vec()),
			None => Ok(Vec::new()),
		}
	}
}
