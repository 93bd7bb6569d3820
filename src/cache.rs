//! Cache-first store over a [`QuestionSource`].
//!
//! The store owns one current filter/pagination context, the list currently on display, and two
//! caches: list pages keyed by [`CacheKey`] and questions keyed by id. Cache entries never
//! expire; they go away only through [`QuestionCacheStore::clear_cache`] or get overwritten by a
//! forced refresh. Concurrent loads of the same uncached key are not collapsed: each one
//! fetches and the last write wins.
//!
//! Failures never escape the store. They are recorded as a user-visible message and the
//! previously displayed data stays in place.

pub mod key;
mod metrics;

pub use key::CacheKey;
pub use metrics::CacheMetrics;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	gateway::{QuestionPage, QuestionSource},
	obs::{self, OperationKind, OperationOutcome},
	question::{
		FilterOptions, FilterUpdate, PaginationOptions, PaginationUpdate, Question, QuestionId,
	},
};

/// Coarse state of the most recent load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadStatus {
	/// Nothing has been loaded yet.
	#[default]
	Idle,
	/// A fetch is in flight.
	Loading,
	/// The last fetch failed; see [`QuestionCacheStore::error`].
	Error,
	/// The last fetch succeeded.
	Ready,
}

/// Result of a store load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome<T> {
	/// Served from a cache without touching the network.
	Cached(T),
	/// Fetched from the gateway and written to the store.
	Fetched(T),
	/// The fetch failed; the message is also available via [`QuestionCacheStore::error`].
	Failed(String),
	/// Nothing to do (blank search keyword).
	Skipped,
}
impl<T> LoadOutcome<T> {
	/// Borrows the loaded value.
	pub fn value(&self) -> Option<&T> {
		match self {
			LoadOutcome::Cached(value) | LoadOutcome::Fetched(value) => Some(value),
			LoadOutcome::Failed(_) | LoadOutcome::Skipped => None,
		}
	}

	/// Returns the loaded value.
	pub fn into_value(self) -> Option<T> {
		match self {
			LoadOutcome::Cached(value) | LoadOutcome::Fetched(value) => Some(value),
			LoadOutcome::Failed(_) | LoadOutcome::Skipped => None,
		}
	}

	/// Whether the value came from a cache.
	pub fn is_cached(&self) -> bool {
		matches!(self, LoadOutcome::Cached(_))
	}

	/// Whether the load failed.
	pub fn is_failed(&self) -> bool {
		matches!(self, LoadOutcome::Failed(_))
	}
}

/// Neighbors of a question within the list on display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacentIds {
	/// Previous question, absent at the first position.
	pub prev: Option<QuestionId>,
	/// Next question, absent at the last position.
	pub next: Option<QuestionId>,
}

#[derive(Clone, Debug)]
struct CachedPage {
	questions: Vec<Question>,
	total: u64,
}

#[derive(Debug)]
struct StoreState {
	filters: FilterOptions,
	pagination: PaginationOptions,
	questions: Vec<Question>,
	current_question: Option<Question>,
	categories: Vec<String>,
	status: LoadStatus,
	error: Option<String>,
	lists: HashMap<CacheKey, CachedPage>,
	details: HashMap<QuestionId, Question>,
}
impl StoreState {
	fn new(page_size: u32) -> Self {
		Self {
			filters: FilterOptions::default(),
			pagination: PaginationOptions::new(page_size),
			questions: Vec::new(),
			current_question: None,
			categories: Vec::new(),
			status: LoadStatus::Idle,
			error: None,
			lists: HashMap::new(),
			details: HashMap::new(),
		}
	}

	fn begin_fetch(&mut self) {
		self.status = LoadStatus::Loading;
		self.error = None;
	}

	fn show_page(&mut self, page: &QuestionPage) {
		self.questions = page.questions.clone();
		self.pagination.total = page.total;
		self.status = LoadStatus::Ready;
	}

	fn record_failure(&mut self, message: String) {
		self.status = LoadStatus::Error;
		self.error = Some(message);
	}
}

/// Filter/pagination state plus list and detail caches in front of a [`QuestionSource`].
///
/// Locks are only held between suspension points, never across a fetch.
pub struct QuestionCacheStore {
	source: Arc<dyn QuestionSource>,
	state: Mutex<StoreState>,
	metrics: Arc<CacheMetrics>,
}
impl QuestionCacheStore {
	/// Creates an empty store whose pagination starts at page 1 with `page_size` items.
	pub fn new(source: Arc<dyn QuestionSource>, page_size: u32) -> Self {
		Self { source, state: Mutex::new(StoreState::new(page_size)), metrics: Default::default() }
	}

	/// Creates an empty store using the configured page size.
	pub fn from_config(source: Arc<dyn QuestionSource>, config: &ClientConfig) -> Self {
		Self::new(source, config.page_size)
	}

	/// Returns the cache counters.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Loads the list for the current filters and page.
	///
	/// A cached page is returned without any status transition unless `force_refresh` is set.
	/// Otherwise the gateway is called and the fresh page is written to the cache.
	pub async fn load_list(&self, force_refresh: bool) -> LoadOutcome<Vec<Question>> {
		let (key, filters, pagination) = {
			let mut state = self.state.lock();
			let key = CacheKey::new(&state.filters, &state.pagination);
			let cached = if force_refresh { None } else { state.lists.get(&key).cloned() };

			if let Some(page) = cached {
				state.questions = page.questions.clone();
				state.pagination.total = page.total;
				self.record_hit(OperationKind::List);

				return LoadOutcome::Cached(page.questions);
			}

			state.begin_fetch();
			self.metrics.record_miss();

			let filters = key.filters();

			(key, filters, state.pagination)
		};
		let result = self.source.list(&filters, pagination).await;
		let mut state = self.state.lock();

		match result {
			Ok(page) => {
				state.show_page(&page);
				state
					.lists
					.insert(key, CachedPage { questions: page.questions.clone(), total: page.total });

				LoadOutcome::Fetched(page.questions)
			},
			Err(e) => self.fail(&mut state, OperationKind::List, &e),
		}
	}

	/// Loads one question, serving it from the detail cache unless `force_refresh` is set.
	pub async fn load_detail(&self, id: &str, force_refresh: bool) -> LoadOutcome<Question> {
		{
			let mut state = self.state.lock();
			let cached = if force_refresh { None } else { state.details.get(id).cloned() };

			if let Some(question) = cached {
				state.current_question = Some(question.clone());
				self.record_hit(OperationKind::Detail);

				return LoadOutcome::Cached(question);
			}

			state.begin_fetch();
			self.metrics.record_miss();
		}

		let result = self.source.get_by_id(id).await;
		let mut state = self.state.lock();

		match result {
			Ok(question) => {
				if let Some(requested) = QuestionId::new(id).ok().filter(|r| *r != question.id) {
					state.details.insert(requested, question.clone());
				}

				state.details.insert(question.id.clone(), question.clone());
				state.current_question = Some(question.clone());
				state.status = LoadStatus::Ready;

				LoadOutcome::Fetched(question)
			},
			Err(e) => self.fail(&mut state, OperationKind::Detail, &e),
		}
	}

	/// Runs a keyword search at the current page position.
	///
	/// Blank keywords are a no-op. Results bypass the list cache in both directions; on success
	/// the keyword is stored in the current filters.
	pub async fn search(&self, keyword: &str) -> LoadOutcome<Vec<Question>> {
		let keyword = keyword.trim();

		if keyword.is_empty() {
			return LoadOutcome::Skipped;
		}

		let pagination = {
			let mut state = self.state.lock();

			state.begin_fetch();

			state.pagination
		};
		let result = self.source.search(keyword, pagination).await;
		let mut state = self.state.lock();

		match result {
			Ok(page) => {
				state.show_page(&page);
				state.filters.search_keyword = Some(keyword.to_owned());

				LoadOutcome::Fetched(page.questions)
			},
			Err(e) => self.fail(&mut state, OperationKind::Search, &e),
		}
	}

	/// Refreshes the category list. An empty answer (including a failed fetch) keeps the
	/// previous categories.
	pub async fn load_categories(&self) -> Vec<String> {
		let fetched = self.source.categories().await;
		let mut state = self.state.lock();

		if fetched.is_empty() {
			obs::log_event(OperationKind::Categories, "no categories returned, keeping previous");
		} else {
			state.categories = fetched;
		}

		state.categories.clone()
	}

	/// Merges `update` into the current filters and moves back to page 1. Cached pages stay.
	pub fn set_filters(&self, update: FilterUpdate) {
		let mut state = self.state.lock();

		state.filters.apply(update);
		state.pagination.page = 1;
	}

	/// Merges `update` into the current pagination.
	pub fn set_pagination(&self, update: PaginationUpdate) {
		self.state.lock().pagination.apply(update);
	}

	/// Clears every filter and moves back to page 1.
	pub fn reset_filters(&self) {
		let mut state = self.state.lock();

		state.filters = FilterOptions::default();
		state.pagination.page = 1;
	}

	/// Empties both caches. Displayed data is kept.
	pub fn clear_cache(&self) {
		let mut state = self.state.lock();

		state.lists.clear();
		state.details.clear();
	}

	/// Returns the ids before and after `current_id` in the list on display.
	pub fn adjacent_ids(&self, current_id: &str) -> AdjacentIds {
		let state = self.state.lock();
		let Some(index) = state.questions.iter().position(|q| q.id.as_str() == current_id) else {
			return AdjacentIds::default();
		};

		AdjacentIds {
			prev: index.checked_sub(1).map(|i| state.questions[i].id.clone()),
			next: state.questions.get(index + 1).map(|q| q.id.clone()),
		}
	}

	/// Returns the list on display.
	pub fn questions(&self) -> Vec<Question> {
		self.state.lock().questions.clone()
	}

	/// Returns the question on display.
	pub fn current_question(&self) -> Option<Question> {
		self.state.lock().current_question.clone()
	}

	/// Returns the known categories.
	pub fn categories(&self) -> Vec<String> {
		self.state.lock().categories.clone()
	}

	/// Returns the status of the most recent load.
	pub fn status(&self) -> LoadStatus {
		self.state.lock().status
	}

	/// Returns the message of the most recent failure, cleared when the next fetch starts.
	pub fn error(&self) -> Option<String> {
		self.state.lock().error.clone()
	}

	/// Returns the current filters.
	pub fn filters(&self) -> FilterOptions {
		self.state.lock().filters.clone()
	}

	/// Returns the current pagination, including the last reported total.
	pub fn pagination(&self) -> PaginationOptions {
		self.state.lock().pagination
	}

	/// Returns the cache key the next [`QuestionCacheStore::load_list`] would use.
	pub fn current_key(&self) -> CacheKey {
		let state = self.state.lock();

		CacheKey::new(&state.filters, &state.pagination)
	}

	/// Page count derived from the current total and page size.
	pub fn total_pages(&self) -> u64 {
		self.state.lock().pagination.total_pages()
	}

	/// Whether a later page exists.
	pub fn has_next_page(&self) -> bool {
		self.state.lock().pagination.has_next()
	}

	/// Whether an earlier page exists.
	pub fn has_prev_page(&self) -> bool {
		self.state.lock().pagination.has_prev()
	}

	/// Number of cached list pages.
	pub fn cached_list_len(&self) -> usize {
		self.state.lock().lists.len()
	}

	/// Number of cached questions.
	pub fn cached_detail_len(&self) -> usize {
		self.state.lock().details.len()
	}

	fn record_hit(&self, kind: OperationKind) {
		self.metrics.record_hit();
		obs::record_outcome(kind, OperationOutcome::CacheHit);
	}

	fn fail<T>(
		&self,
		state: &mut StoreState,
		kind: OperationKind,
		error: &Error,
	) -> LoadOutcome<T> {
		let message = error.to_string();

		self.metrics.record_failure();
		obs::log_failure(kind, error);
		state.record_failure(message.clone());

		LoadOutcome::Failed(message)
	}
}
impl Debug for QuestionCacheStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("QuestionCacheStore")
			.field("filters", &state.filters)
			.field("pagination", &state.pagination)
			.field("status", &state.status)
			.field("cached_lists", &state.lists.len())
			.field("cached_details", &state.details.len())
			.finish_non_exhaustive()
	}
}
