//! Shared fixtures for integration tests: a scripted in-process HTTP client plus response and
//! transport builders.

#![allow(dead_code)]

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
};
// crates.io
use http::{HeaderMap, StatusCode, header::RETRY_AFTER};
use parking_lot::Mutex;
use serde_json::{Value, json};
use url::Url;
// self
use tiku_client::{
	config::ClientConfig,
	http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse},
	store::MemoryStore,
	transport::{AuthenticatedTransport, ReauthEvent, ReauthHandler},
};

pub const BASE_URL: &str = "http://tiku.test/api";

#[derive(Debug)]
pub struct FakeTransportError;
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Connection refused.")
	}
}
impl StdError for FakeTransportError {}

/// What the scripted client saw for one dispatched request.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: String,
	pub path: String,
	pub query: Vec<(String, String)>,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
}
impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn query_value(&self, key: &str) -> Option<&str> {
		self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	pub fn json_body(&self) -> Value {
		serde_json::from_slice(&self.body).expect("Recorded body should be JSON.")
	}
}

type Responder = dyn Fn(&RecordedRequest) -> Result<HttpResponse, FakeTransportError> + Send + Sync;

/// HTTP client answering every request through a closure and recording what it received.
pub struct ScriptedHttpClient {
	responder: Box<Responder>,
	requests: Mutex<Vec<RecordedRequest>>,
}
impl ScriptedHttpClient {
	pub fn new(
		responder: impl Fn(&RecordedRequest) -> Result<HttpResponse, FakeTransportError>
		+ Send
		+ Sync
		+ 'static,
	) -> Arc<Self> {
		Arc::new(Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()) })
	}

	/// Answers every request with the same status and body.
	pub fn always(status: u16, body: Value) -> Arc<Self> {
		Self::new(move |_| Ok(json_response(status, &body)))
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}

	pub fn last_request(&self) -> RecordedRequest {
		self.requests.lock().last().cloned().expect("At least one request should be recorded.")
	}
}
impl ApiHttpClient for ScriptedHttpClient {
	type TransportError = FakeTransportError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let recorded = record(&request);
		let result = (self.responder)(&recorded);

		self.requests.lock().push(recorded);

		Box::pin(async move { result })
	}
}

fn record(request: &HttpRequest) -> RecordedRequest {
	let url = Url::parse(&request.uri().to_string()).expect("Request URI should be absolute.");

	RecordedRequest {
		method: request.method().to_string(),
		path: url.path().to_owned(),
		query: url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect(),
		headers: request.headers().clone(),
		body: request.body().clone(),
	}
}

pub fn json_response(status: u16, body: &Value) -> HttpResponse {
	let mut response = HttpResponse::new(
		serde_json::to_vec(body).expect("Response fixture should serialize."),
	);

	*response.status_mut() = StatusCode::from_u16(status).expect("Status fixture should be valid.");

	response
}

pub fn rate_limited(retry_after_secs: u64) -> HttpResponse {
	let mut response = json_response(429, &json!({ "success": false, "message": "Too many" }));

	response.headers_mut().insert(
		RETRY_AFTER,
		retry_after_secs.to_string().parse().expect("Retry-After fixture should be valid."),
	);

	response
}

pub fn ok(data: Value) -> Value {
	json!({ "success": true, "data": data })
}

pub fn failure(message: &str) -> Value {
	json!({ "success": false, "message": message })
}

pub fn question(id: &str, text: &str) -> Value {
	json!({ "_id": id, "question": text, "answer": format!("answer to {text}"), "tags": [] })
}

pub fn list_page(questions: Value, total: u64) -> Value {
	ok(json!({
		"questions": questions,
		"pagination": { "page": 1, "pageSize": 20, "total": total, "totalPages": 1 }
	}))
}

pub fn config(guest_limit: u64) -> ClientConfig {
	ClientConfig::builder()
		.base_url_str(BASE_URL)
		.expect("Base URL fixture should parse.")
		.guest_limit(guest_limit)
		.client_identity("tiku-it")
		.build()
		.expect("Config fixture should be valid.")
}

pub fn transport(
	client: Arc<ScriptedHttpClient>,
	session: &MemoryStore,
	guest_limit: u64,
) -> AuthenticatedTransport<ScriptedHttpClient> {
	AuthenticatedTransport::with_http_client(
		&config(guest_limit),
		Arc::new(session.clone()),
		client,
	)
}

/// Reauth handler collecting every event it receives.
#[derive(Clone, Default)]
pub struct RecordingReauth {
	events: Arc<Mutex<Vec<ReauthEvent>>>,
}
impl RecordingReauth {
	pub fn events(&self) -> Vec<ReauthEvent> {
		self.events.lock().clone()
	}

	pub fn handler(&self) -> Arc<dyn ReauthHandler> {
		let events = self.events.clone();

		Arc::new(move |event: &ReauthEvent| events.lock().push(event.clone()))
	}
}
