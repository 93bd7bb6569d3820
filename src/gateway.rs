//! Typed operations over the question endpoints.
//!
//! Every operation unwraps the response [`Envelope`]: `success = false` becomes
//! [`Error::Remote`] (or [`Error::NotFound`] for detail lookups) and every inbound record is
//! normalized through [`RawQuestion::normalize`] before it is returned. `categories` and
//! `stats` are best-effort and degrade to empty results instead of failing.

pub mod envelope;

pub use envelope::*;

// self
use crate::{
	_prelude::*,
	http::ApiHttpClient,
	obs::{self, OperationKind},
	question::{FilterOptions, PaginationOptions, Question, QuestionId, RawQuestion},
	transport::{ApiRequest, AuthenticatedTransport},
};

/// Boxed future returned by fallible [`QuestionSource`] operations.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;
/// Boxed future returned by best-effort [`QuestionSource`] operations.
pub type BestEffortFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

const LIST_FAILED: &str = "Failed to load the question list.";
const SEARCH_FAILED: &str = "Failed to search questions.";
const CATEGORIES_FAILED: &str = "Failed to load categories.";
const STATS_FAILED: &str = "Failed to load statistics.";
const BATCH_FAILED: &str = "Failed to load questions by id.";

/// Read-side contract the cache store depends on.
///
/// [`QuestionGateway`] is the production implementation; tests substitute their own.
pub trait QuestionSource
where
	Self: Send + Sync,
{
	/// Fetches one filtered page.
	fn list<'a>(
		&'a self,
		filters: &'a FilterOptions,
		pagination: PaginationOptions,
	) -> SourceFuture<'a, QuestionPage>;

	/// Fetches one question by id.
	fn get_by_id<'a>(&'a self, id: &'a str) -> SourceFuture<'a, Question>;

	/// Runs a keyword search.
	fn search<'a>(
		&'a self,
		keyword: &'a str,
		pagination: PaginationOptions,
	) -> SourceFuture<'a, QuestionPage>;

	/// Lists categories; failures yield an empty list.
	fn categories(&self) -> BestEffortFuture<'_, Vec<String>>;
}

/// Question endpoints on top of a shared [`AuthenticatedTransport`].
pub struct QuestionGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	transport: Arc<AuthenticatedTransport<C>>,
}
impl<C> QuestionGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a gateway sharing `transport` (and therefore its quota and session).
	pub fn new(transport: Arc<AuthenticatedTransport<C>>) -> Self {
		Self { transport }
	}

	/// Returns the underlying transport.
	pub fn transport(&self) -> &Arc<AuthenticatedTransport<C>> {
		&self.transport
	}

	/// `GET /questions` with `page`, `pageSize`, and whichever filters are set.
	pub async fn list(
		&self,
		filters: &FilterOptions,
		pagination: PaginationOptions,
	) -> Result<QuestionPage> {
		let filters = filters.normalized();
		let request = ApiRequest::get(OperationKind::List, ["questions"])
			.query("page", pagination.page)
			.query("pageSize", pagination.page_size)
			.query_opt("category", filters.category)
			.query_opt("difficulty", filters.difficulty)
			.query_opt("search", filters.search_keyword);
		let envelope =
			self.transport.send::<Envelope<Value>>(request).await?.decode::<ListData>()?;

		into_page(envelope.into_data(LIST_FAILED)?)
	}

	/// `GET /questions/{id}`. A failed envelope or HTTP 404 becomes [`Error::NotFound`].
	pub async fn get_by_id(&self, id: &str) -> Result<Question> {
		let not_found = || Error::NotFound { id: id.to_owned() };
		let id = QuestionId::new(id).map_err(|_| not_found())?;
		let request = ApiRequest::get(OperationKind::Detail, ["questions", id.as_str()]);
		let envelope = match self.transport.send::<Envelope<Value>>(request).await {
			Ok(envelope) => envelope.decode::<RawQuestion>()?,
			Err(Error::RequestFailed { status: 404, .. }) => return Err(not_found()),
			Err(e) => return Err(e),
		};

		if !envelope.success {
			obs::log_event(OperationKind::Detail, "service reported the question as missing");

			return Err(not_found());
		}

		let raw = envelope.data.ok_or_else(not_found)?;

		raw.normalize().map_err(unusable_record)
	}

	/// `GET /questions/search` with `q`, `page`, and `pageSize`.
	pub async fn search(&self, keyword: &str, pagination: PaginationOptions) -> Result<QuestionPage> {
		let request = ApiRequest::get(OperationKind::Search, ["questions", "search"])
			.query("q", keyword.trim())
			.query("page", pagination.page)
			.query("pageSize", pagination.page_size);
		let envelope =
			self.transport.send::<Envelope<Value>>(request).await?.decode::<ListData>()?;

		into_page(envelope.into_data(SEARCH_FAILED)?)
	}

	/// `GET /questions/categories`; any failure yields an empty list.
	pub async fn categories(&self) -> Vec<String> {
		let request = ApiRequest::get(OperationKind::Categories, ["questions", "categories"]);
		let result = self
			.transport
			.send::<Envelope<Value>>(request)
			.await
			.and_then(|envelope| envelope.decode::<Vec<String>>())
			.and_then(|envelope| envelope.into_data(CATEGORIES_FAILED));

		result.unwrap_or_else(|e| {
			obs::log_failure(OperationKind::Categories, &e);

			Vec::new()
		})
	}

	/// `GET /questions/stats`; any failure yields `None`.
	pub async fn stats(&self) -> Option<QuestionStats> {
		let request = ApiRequest::get(OperationKind::Stats, ["questions", "stats"]);
		let result = self
			.transport
			.send::<Envelope<Value>>(request)
			.await
			.and_then(|envelope| envelope.decode::<QuestionStats>())
			.and_then(|envelope| envelope.into_data(STATS_FAILED));

		result.map_err(|e| obs::log_failure(OperationKind::Stats, &e)).ok()
	}

	/// `POST /questions/batch` with `{ "ids": [...] }`. An empty id list short-circuits.
	pub async fn batch<I, S>(&self, ids: I) -> Result<Vec<Question>>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let ids = ids.into_iter().map(Into::into).collect::<Vec<String>>();

		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let request = ApiRequest::post(OperationKind::Batch, ["questions", "batch"])
			.json_body(serde_json::json!({ "ids": ids }));
		let envelope =
			self.transport.send::<Envelope<Value>>(request).await?.decode::<BatchData>()?;

		normalize_all(envelope.into_data(BATCH_FAILED)?.into_records())
	}
}
impl<C> Clone for QuestionGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone() }
	}
}
impl<C> Debug for QuestionGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("QuestionGateway").field("transport", &self.transport).finish()
	}
}
impl<C> QuestionSource for QuestionGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn list<'a>(
		&'a self,
		filters: &'a FilterOptions,
		pagination: PaginationOptions,
	) -> SourceFuture<'a, QuestionPage> {
		Box::pin(QuestionGateway::list(self, filters, pagination))
	}

	fn get_by_id<'a>(&'a self, id: &'a str) -> SourceFuture<'a, Question> {
		Box::pin(QuestionGateway::get_by_id(self, id))
	}

	fn search<'a>(
		&'a self,
		keyword: &'a str,
		pagination: PaginationOptions,
	) -> SourceFuture<'a, QuestionPage> {
		Box::pin(QuestionGateway::search(self, keyword, pagination))
	}

	fn categories(&self) -> BestEffortFuture<'_, Vec<String>> {
		Box::pin(QuestionGateway::categories(self))
	}
}

fn into_page(data: ListData) -> Result<QuestionPage> {
	let reported = data.pagination.map(|info| info.total);
	let questions = normalize_all(data.questions)?;
	let total = reported.unwrap_or(questions.len() as u64);

	Ok(QuestionPage { questions, total })
}

fn normalize_all(records: Vec<RawQuestion>) -> Result<Vec<Question>> {
	records.into_iter().map(|raw| raw.normalize().map_err(unusable_record)).collect()
}

fn unusable_record(e: crate::question::IdentifierError) -> Error {
	Error::Remote { message: format!("Question record is unusable: {e}") }
}
