//! Filter and pagination state, plus the partial updates the cache store merges into them.

// self
use crate::{_prelude::*, config::DEFAULT_PAGE_SIZE};

/// Optional list constraints. An absent field means "no constraint"; blank strings are
/// treated as absent everywhere the filters are read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
	/// Category name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Difficulty label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub difficulty: Option<String>,
	/// Free-text keyword.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub search_keyword: Option<String>,
}
impl FilterOptions {
	/// Returns a copy with blank fields collapsed to `None`.
	pub fn normalized(&self) -> Self {
		Self {
			category: non_blank(self.category.as_deref()),
			difficulty: non_blank(self.difficulty.as_deref()),
			search_keyword: non_blank(self.search_keyword.as_deref()),
		}
	}

	/// Returns `true` when no field constrains the query.
	pub fn is_unconstrained(&self) -> bool {
		self.normalized() == Self::default()
	}

	/// Merges `update` into these filters. Fields the update leaves untouched keep their value.
	pub fn apply(&mut self, update: FilterUpdate) {
		if let Some(category) = update.category {
			self.category = category;
		}
		if let Some(difficulty) = update.difficulty {
			self.difficulty = difficulty;
		}
		if let Some(keyword) = update.search_keyword {
			self.search_keyword = keyword;
		}
	}
}

/// Partial filter update: the outer `Option` says whether a field is touched, the inner one
/// whether it is set or cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterUpdate {
	/// Category change.
	pub category: Option<Option<String>>,
	/// Difficulty change.
	pub difficulty: Option<Option<String>>,
	/// Keyword change.
	pub search_keyword: Option<Option<String>>,
}
impl FilterUpdate {
	/// Creates an update that touches nothing.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the category.
	pub fn category(mut self, value: impl Into<String>) -> Self {
		self.category = Some(Some(value.into()));

		self
	}

	/// Clears the category constraint.
	pub fn clear_category(mut self) -> Self {
		self.category = Some(None);

		self
	}

	/// Sets the difficulty.
	pub fn difficulty(mut self, value: impl Into<String>) -> Self {
		self.difficulty = Some(Some(value.into()));

		self
	}

	/// Clears the difficulty constraint.
	pub fn clear_difficulty(mut self) -> Self {
		self.difficulty = Some(None);

		self
	}

	/// Sets the keyword.
	pub fn search_keyword(mut self, value: impl Into<String>) -> Self {
		self.search_keyword = Some(Some(value.into()));

		self
	}

	/// Clears the keyword constraint.
	pub fn clear_search_keyword(mut self) -> Self {
		self.search_keyword = Some(None);

		self
	}
}

/// Page position plus the server-reported total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
	/// One-based page number.
	pub page: u32,
	/// Items per page, at least one.
	pub page_size: u32,
	/// Total matching items as last reported by the service; never sent in requests.
	pub total: u64,
}
impl PaginationOptions {
	/// Creates first-page pagination with the given page size (clamped to at least one).
	pub fn new(page_size: u32) -> Self {
		Self { page: 1, page_size: page_size.max(1), total: 0 }
	}

	/// Number of pages implied by `total` and `page_size`.
	pub fn total_pages(&self) -> u64 {
		self.total.div_ceil(u64::from(self.page_size.max(1)))
	}

	/// Whether a later page exists.
	pub fn has_next(&self) -> bool {
		u64::from(self.page) < self.total_pages()
	}

	/// Whether an earlier page exists.
	pub fn has_prev(&self) -> bool {
		self.page > 1
	}

	/// Merges `update`, clamping page and page size to at least one.
	pub fn apply(&mut self, update: PaginationUpdate) {
		if let Some(page) = update.page {
			self.page = page.max(1);
		}
		if let Some(page_size) = update.page_size {
			self.page_size = page_size.max(1);
		}
	}
}
impl Default for PaginationOptions {
	fn default() -> Self {
		Self::new(DEFAULT_PAGE_SIZE)
	}
}

/// Partial pagination update; `total` is service-reported and cannot be set here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
	/// New page number.
	pub page: Option<u32>,
	/// New page size.
	pub page_size: Option<u32>,
}
impl PaginationUpdate {
	/// Creates an update that touches nothing.
	pub fn new() -> Self {
		Self::default()
	}

	/// Moves to `page`.
	pub fn page(mut self, page: u32) -> Self {
		self.page = Some(page);

		self
	}

	/// Changes the page size.
	pub fn page_size(mut self, page_size: u32) -> Self {
		self.page_size = Some(page_size);

		self
	}
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty()).map(str::to_owned)
}
