mod common;

// std
use std::sync::Arc;
// crates.io
use serde_json::{Value, json};
// self
use common::{RecordingReauth, ScriptedHttpClient};
use tiku_client::{
	auth::{Session, TokenSecret},
	error::Error,
	gateway::Envelope,
	obs::OperationKind,
	sign::RequestSigner,
	store::MemoryStore,
	transport::{ApiRequest, ReauthReason, SIGN_HEADER, TIMESTAMP_HEADER, USER_TYPE_HEADER},
};

fn categories_request() -> ApiRequest {
	ApiRequest::get(OperationKind::Categories, ["questions", "categories"])
}

#[tokio::test]
async fn guest_quota_rejects_the_request_after_the_limit_without_dispatch() {
	let client = ScriptedHttpClient::always(200, common::ok(json!(["xpath"])));
	let session = MemoryStore::default();
	let transport = common::transport(client.clone(), &session, 3);

	for _ in 0..3 {
		transport
			.send::<Envelope<Vec<String>>>(categories_request())
			.await
			.expect("Guest requests within the limit should succeed.");
	}

	let err = transport
		.send::<Envelope<Vec<String>>>(categories_request())
		.await
		.expect_err("The request past the limit should be rejected locally.");

	assert!(matches!(err, Error::QuotaExceeded { limit: 3 }));
	assert_eq!(client.request_count(), 3);
	assert_eq!(transport.metrics.quota_rejections(), 1);
	assert_eq!(transport.quota().count(), 4);
}

#[tokio::test]
async fn registered_requests_skip_the_quota_and_carry_a_bearer_token() {
	let client = ScriptedHttpClient::always(200, common::ok(json!([])));
	let session = MemoryStore::with_session(Session::with_token("tok-1"));
	let transport = common::transport(client.clone(), &session, 1);

	for _ in 0..3 {
		transport
			.send::<Envelope<Vec<String>>>(categories_request())
			.await
			.expect("Registered requests should not be limited.");
	}

	let recorded = client.last_request();

	assert_eq!(client.request_count(), 3);
	assert_eq!(transport.quota().count(), 0);
	assert_eq!(recorded.header("authorization"), Some("Bearer tok-1"));
	assert_eq!(recorded.header(USER_TYPE_HEADER), Some("registered"));
	assert_eq!(recorded.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn guest_requests_carry_signature_headers_bound_to_the_timestamp() {
	let client = ScriptedHttpClient::always(200, common::ok(json!([])));
	let session = MemoryStore::default();
	let transport = common::transport(client.clone(), &session, 10);
	let request = ApiRequest::get(OperationKind::List, ["questions"])
		.query("page", 1)
		.query("category", "xpath");

	transport.send::<Envelope<Value>>(request.clone()).await.expect("Request should succeed.");

	let recorded = client.last_request();
	let timestamp = recorded
		.header(TIMESTAMP_HEADER)
		.expect("Timestamp header should be present.")
		.parse::<i64>()
		.expect("Timestamp header should be numeric.");
	let expected = RequestSigner::from_config(&common::config(10))
		.sign_at(&request.combined_params(), timestamp);

	assert!(recorded.header("authorization").is_none());
	assert_eq!(recorded.header(USER_TYPE_HEADER), Some("guest"));
	assert_eq!(recorded.header(SIGN_HEADER), Some(expected.value.as_str()));
	assert_eq!(recorded.path, "/api/questions");
	assert_eq!(recorded.query_value("category"), Some("xpath"));
}

#[tokio::test]
async fn unauthorized_clears_the_session_and_notifies_once_without_retry() {
	let client = ScriptedHttpClient::always(401, json!({ "success": false, "error": "expired" }));
	let session = MemoryStore::with_session(Session::with_token("stale"));
	let reauth = RecordingReauth::default();
	let transport =
		common::transport(client.clone(), &session, 10).with_reauth_handler(reauth.handler());
	let err = transport
		.send::<Envelope<Value>>(categories_request())
		.await
		.expect_err("A 401 should fail the request.");
	let events = reauth.events();

	assert!(matches!(err, Error::Unauthorized));
	assert_eq!(client.request_count(), 1);
	assert!(!session.snapshot().is_registered());
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].reason, ReauthReason::Unauthorized);
	assert_eq!(events[0].path.as_deref(), Some("/questions/categories"));
	assert_eq!(transport.metrics.unauthorized(), 1);
}

#[tokio::test]
async fn failures_are_classified_by_status() {
	let client = ScriptedHttpClient::new(|request| {
		Ok(match request.query_value("case") {
			Some("forbidden") =>
				common::json_response(403, &json!({ "success": false, "message": "签名无效" })),
			Some("limited") => common::rate_limited(7),
			_ => common::json_response(503, &json!({ "success": false })),
		})
	});
	let session = MemoryStore::with_session(Session::with_token("tok"));
	let transport = common::transport(client, &session, 10);
	let send = |case: &'static str| {
		transport.send::<Envelope<Value>>(categories_request().query("case", case))
	};

	match send("forbidden").await.expect_err("403 should fail.") {
		Error::Forbidden { message } => assert_eq!(message, "签名无效"),
		other => panic!("Unexpected error: {other:?}."),
	}
	match send("limited").await.expect_err("429 should fail.") {
		Error::RateLimited { retry_after, .. } =>
			assert_eq!(retry_after, Some(time::Duration::seconds(7))),
		other => panic!("Unexpected error: {other:?}."),
	}
	match send("other").await.expect_err("503 should fail.") {
		Error::RequestFailed { status, message } => {
			assert_eq!(status, 503);
			assert_eq!(message, "Service Unavailable");
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert!(session.snapshot().is_registered(), "Only a 401 may clear the session.");
}

#[tokio::test]
async fn transport_failures_surface_as_transport_errors() {
	let client = ScriptedHttpClient::new(|_| Err(common::FakeTransportError));
	let session = MemoryStore::default();
	let transport = common::transport(client, &session, 10);
	let err = transport
		.send::<Envelope<Value>>(categories_request())
		.await
		.expect_err("Transport failures should propagate.");

	assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn undecodable_success_bodies_report_the_failing_path() {
	let client = ScriptedHttpClient::always(200, json!({ "success": true, "data": 42 }));
	let session = MemoryStore::default();
	let transport = common::transport(client, &session, 10);
	let err = transport
		.send::<Envelope<Vec<String>>>(categories_request())
		.await
		.expect_err("A number should not decode into a list.");

	match err {
		Error::Decode { source, status } => {
			assert_eq!(status, 200);
			assert_eq!(source.path().to_string(), "data");
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn shared_transport_shares_one_quota() {
	let client = ScriptedHttpClient::always(200, common::ok(json!([])));
	let session = MemoryStore::default();
	let transport = Arc::new(common::transport(client.clone(), &session, 2));
	let other = transport.clone();

	transport.send::<Envelope<Value>>(categories_request()).await.expect("First should pass.");
	other.send::<Envelope<Value>>(categories_request()).await.expect("Second should pass.");

	let err = transport
		.send::<Envelope<Value>>(categories_request())
		.await
		.expect_err("Third should be rejected.");

	assert!(matches!(err, Error::QuotaExceeded { .. }));
	assert_eq!(client.request_count(), 2);
	assert_eq!(
		session.snapshot().token.as_ref().map(TokenSecret::expose),
		None,
		"Guest traffic never creates a session."
	);
}
