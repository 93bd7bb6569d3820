mod common;

// std
use std::sync::Arc;
// crates.io
use serde_json::json;
// self
use common::ScriptedHttpClient;
use tiku_client::{
	error::Error,
	gateway::{QuestionGateway, QuestionSource},
	question::{Difficulty, FilterOptions, PaginationOptions},
	store::MemoryStore,
};

fn gateway(client: Arc<ScriptedHttpClient>) -> QuestionGateway<ScriptedHttpClient> {
	QuestionGateway::new(Arc::new(common::transport(client, &MemoryStore::default(), 100)))
}

#[tokio::test]
async fn list_normalizes_object_ids_and_reports_total() {
	let client = ScriptedHttpClient::always(
		200,
		common::list_page(
			json!([
				{ "_id": "65a1", "question": "What is XPath?", "answer": "A query language.", "difficulty": "easy" },
				{ "id": 7, "question": "What is a cookie?", "answer": "State." }
			]),
			45,
		),
	);
	let page = gateway(client)
		.list(&FilterOptions::default(), PaginationOptions::new(20))
		.await
		.expect("List should succeed.");

	assert_eq!(page.total, 45);
	assert_eq!(page.questions.len(), 2);
	assert_eq!(page.questions[0].id.as_str(), "65a1");
	assert_eq!(page.questions[0].difficulty, Some(Difficulty::Easy));
	assert_eq!(page.questions[1].id.as_str(), "7");
}

#[tokio::test]
async fn list_sends_only_the_filters_that_are_set() {
	let client = ScriptedHttpClient::always(200, common::list_page(json!([]), 0));
	let filters = FilterOptions {
		category: Some("爬虫基础".into()),
		difficulty: Some("   ".into()),
		search_keyword: None,
	};
	let mut pagination = PaginationOptions::new(10);

	pagination.page = 3;
	pagination.total = 99;

	gateway(client.clone()).list(&filters, pagination).await.expect("List should succeed.");

	let recorded = client.last_request();

	assert_eq!(recorded.path, "/api/questions");
	assert_eq!(recorded.query_value("page"), Some("3"));
	assert_eq!(recorded.query_value("pageSize"), Some("10"));
	assert_eq!(recorded.query_value("category"), Some("爬虫基础"));
	assert_eq!(recorded.query_value("difficulty"), None);
	assert_eq!(recorded.query_value("search"), None);
	assert_eq!(recorded.query_value("total"), None);
}

#[tokio::test]
async fn list_fails_with_the_envelope_message() {
	let client = ScriptedHttpClient::always(200, common::failure("数据库繁忙"));
	let err = gateway(client)
		.list(&FilterOptions::default(), PaginationOptions::default())
		.await
		.expect_err("A failed envelope should surface.");

	assert!(matches!(&err, Error::Remote { message } if message == "数据库繁忙"));
}

#[tokio::test]
async fn list_rejects_records_without_any_id() {
	let client = ScriptedHttpClient::always(
		200,
		common::list_page(json!([{ "question": "Orphan?", "answer": "Yes." }]), 1),
	);
	let err = gateway(client)
		.list(&FilterOptions::default(), PaginationOptions::default())
		.await
		.expect_err("Records without ids must not reach callers.");

	assert!(matches!(err, Error::Remote { .. }));
}

#[tokio::test]
async fn get_by_id_maps_remote_failures_to_not_found() {
	let client = ScriptedHttpClient::new(|request| {
		Ok(match request.path.as_str() {
			"/api/questions/found" =>
				common::json_response(200, &common::ok(common::question("found", "Here?"))),
			"/api/questions/gone" => common::json_response(404, &common::failure("题目不存在")),
			_ => common::json_response(200, &common::failure("题目不存在")),
		})
	});
	let gateway = gateway(client.clone());
	let found = gateway.get_by_id("found").await.expect("Existing question should load.");

	assert_eq!(found.id.as_str(), "found");

	for id in ["gone", "missing", ""] {
		match gateway.get_by_id(id).await.expect_err("Missing questions should fail.") {
			Error::NotFound { id: reported } => assert_eq!(reported, id),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	assert_eq!(client.request_count(), 3, "Blank ids are rejected before dispatch.");
}

#[tokio::test]
async fn failure_envelopes_with_malformed_data_keep_their_meaning() {
	let client = ScriptedHttpClient::new(|request| {
		Ok(match request.path.as_str() {
			"/api/questions" => common::json_response(
				200,
				&json!({ "success": false, "message": "服务器繁忙", "data": { "questions": 3 } }),
			),
			_ => common::json_response(
				200,
				&json!({ "success": false, "message": "题目不存在", "data": {} }),
			),
		})
	});
	let gateway = gateway(client);
	let err = gateway
		.list(&FilterOptions::default(), PaginationOptions::default())
		.await
		.expect_err("A failed envelope should surface.");

	assert!(matches!(&err, Error::Remote { message } if message == "服务器繁忙"));

	let err = gateway.get_by_id("q-404").await.expect_err("A failed envelope should surface.");

	assert!(matches!(&err, Error::NotFound { id } if id == "q-404"));
}

#[tokio::test]
async fn search_sends_keyword_and_page() {
	let client = ScriptedHttpClient::always(
		200,
		common::list_page(json!([common::question("s1", "Selenium waits")]), 1),
	);
	let page = gateway(client.clone())
		.search(" selenium ", PaginationOptions::new(5))
		.await
		.expect("Search should succeed.");
	let recorded = client.last_request();

	assert_eq!(page.questions[0].id.as_str(), "s1");
	assert_eq!(recorded.path, "/api/questions/search");
	assert_eq!(recorded.query_value("q"), Some("selenium"));
	assert_eq!(recorded.query_value("page"), Some("1"));
	assert_eq!(recorded.query_value("pageSize"), Some("5"));
}

#[tokio::test]
async fn categories_and_stats_are_best_effort() {
	let failing = gateway(ScriptedHttpClient::always(500, json!({ "success": false })));

	assert!(failing.categories().await.is_empty());
	assert!(failing.stats().await.is_none());

	let rejected = gateway(ScriptedHttpClient::always(200, common::failure("nope")));

	assert!(rejected.categories().await.is_empty());

	let client = ScriptedHttpClient::new(|request| {
		Ok(match request.path.as_str() {
			"/api/questions/categories" =>
				common::json_response(200, &common::ok(json!(["xpath", "cookies"]))),
			_ => common::json_response(200, &common::ok(json!({ "total": 120 }))),
		})
	});
	let working = gateway(client);
	let source: &dyn QuestionSource = &working;

	assert_eq!(source.categories().await, vec!["xpath".to_owned(), "cookies".to_owned()]);
	assert_eq!(working.stats().await.and_then(|stats| stats.count("total")), Some(120));
}

#[tokio::test]
async fn batch_posts_ids_and_normalizes_records() {
	let client = ScriptedHttpClient::always(
		200,
		common::ok(json!([common::question("a", "First"), common::question("b", "Second")])),
	);
	let gateway = gateway(client.clone());
	let questions = gateway.batch(["a", "b"]).await.expect("Batch should succeed.");
	let recorded = client.last_request();

	assert_eq!(questions.iter().map(|q| q.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
	assert_eq!(recorded.method, "POST");
	assert_eq!(recorded.path, "/api/questions/batch");
	assert_eq!(recorded.json_body(), json!({ "ids": ["a", "b"] }));

	let empty = gateway.batch(Vec::<String>::new()).await.expect("Empty batch should succeed.");

	assert!(empty.is_empty());
	assert_eq!(client.request_count(), 1);
}
