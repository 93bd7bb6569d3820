//! Walks the whole client stack against a mock question service: guest browsing through the
//! cache store, a login, and a detail lookup with the bearer token attached.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use tiku_client::{
	account::Credentials,
	cache::QuestionCacheStore,
	config::ClientConfig,
	gateway::QuestionGateway,
	question::{FilterUpdate, PaginationUpdate},
	store::MemoryStore,
	transport::{AuthenticatedTransport, ReauthEvent},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let list_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/questions").query_param("category", "xpath");
			then.status(200).json_body(json!({
				"success": true,
				"data": {
					"questions": [
						{ "_id": "q-1", "question": "What does // select?", "answer": "Descendants.", "category": "xpath" },
						{ "_id": "q-2", "question": "What does @ select?", "answer": "Attributes.", "category": "xpath" }
					],
					"pagination": { "page": 1, "pageSize": 20, "total": 2, "totalPages": 1 }
				}
			}));
		})
		.await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200).json_body(json!({
				"success": true,
				"data": { "token": "demo-jwt", "user": { "username": "demo" } }
			}));
		})
		.await;
	let detail_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/questions/q-2").header("authorization", "Bearer demo-jwt");
			then.status(200).json_body(json!({
				"success": true,
				"data": { "_id": "q-2", "question": "What does @ select?", "answer": "Attributes." }
			}));
		})
		.await;
	let config = ClientConfig::builder().base_url_str(&server.url("/api"))?.guest_limit(5).build()?;
	let session = Arc::new(MemoryStore::default());
	let transport = Arc::new(
		AuthenticatedTransport::new(&config, session.clone())?.with_reauth_handler(Arc::new(
			|event: &ReauthEvent| println!("Re-authentication requested: {}.", event.reason),
		)),
	);
	let gateway = Arc::new(QuestionGateway::new(transport.clone()));
	let store = QuestionCacheStore::from_config(gateway.clone(), &config);

	store.set_filters(FilterUpdate::new().category("xpath"));
	store.set_pagination(PaginationUpdate::new().page_size(20));
	store.load_list(false).await;
	store.load_list(false).await;

	println!(
		"Loaded {} questions over {} page(s); cache hits so far: {}.",
		store.questions().len(),
		store.total_pages(),
		store.metrics().hits()
	);
	println!("Guest requests left: {}.", transport.quota().remaining());

	transport.login(&Credentials::new("demo", "demo-password")).await?;

	let detail = store.load_detail("q-2", false).await;
	let neighbors = store.adjacent_ids("q-2");

	println!("Detail outcome cached: {}.", detail.is_cached());
	println!("Previous question: {:?}.", neighbors.prev);

	transport.logout().await?;

	list_mock.assert_calls_async(1).await;
	login_mock.assert_async().await;
	detail_mock.assert_async().await;

	Ok(())
}
