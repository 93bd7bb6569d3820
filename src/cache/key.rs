//! Structural cache keys for list queries.

// self
use crate::{
	_prelude::*,
	question::{FilterOptions, PaginationOptions, query::non_blank},
};

/// Canonical identity of a list query: normalized filters plus page position.
///
/// Keys compare by value. Blank filter values collapse to "no constraint", and the reported
/// `total` never takes part, so logically identical queries always address the same entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKey {
	#[serde(skip_serializing_if = "Option::is_none")]
	category: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	difficulty: Option<String>,
	page: u32,
	page_size: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	search_keyword: Option<String>,
}
impl CacheKey {
	/// Derives the key for `filters` at the page position of `pagination`.
	pub fn new(filters: &FilterOptions, pagination: &PaginationOptions) -> Self {
		Self {
			category: non_blank(filters.category.as_deref()),
			difficulty: non_blank(filters.difficulty.as_deref()),
			page: pagination.page,
			page_size: pagination.page_size,
			search_keyword: non_blank(filters.search_keyword.as_deref()),
		}
	}

	/// Returns the normalized filters folded into the key.
	pub fn filters(&self) -> FilterOptions {
		FilterOptions {
			category: self.category.clone(),
			difficulty: self.difficulty.clone(),
			search_keyword: self.search_keyword.clone(),
		}
	}

	/// Returns the page number.
	pub fn page(&self) -> u32 {
		self.page
	}

	/// Returns the page size.
	pub fn page_size(&self) -> u32 {
		self.page_size
	}

	/// Renders the key as compact JSON with alphabetically ordered fields.
	pub fn fingerprint(&self) -> String {
		serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.fingerprint())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn filters(value: Value) -> FilterOptions {
		serde_json::from_value(value).expect("Filter fixture should deserialize.")
	}

	#[test]
	fn field_order_does_not_change_the_key() {
		let pagination = PaginationOptions::new(20);
		let forward = filters(json!({ "category": "xpath", "difficulty": "easy" }));
		let backward = filters(json!({ "difficulty": "easy", "category": "xpath" }));
		let a = CacheKey::new(&forward, &pagination);
		let b = CacheKey::new(&backward, &pagination);
		let mut map = HashMap::new();

		map.insert(a.clone(), 1);

		assert_eq!(a, b);
		assert_eq!(a.fingerprint(), b.fingerprint());
		assert_eq!(map.get(&b), Some(&1));
	}

	#[test]
	fn blank_filters_mean_no_constraint() {
		let pagination = PaginationOptions::new(20);
		let blank = filters(json!({ "category": "  ", "searchKeyword": "" }));

		assert_eq!(
			CacheKey::new(&blank, &pagination),
			CacheKey::new(&FilterOptions::default(), &pagination)
		);
	}

	#[test]
	fn total_is_not_part_of_the_key() {
		let mut reported = PaginationOptions::new(20);

		reported.total = 45;

		assert_eq!(
			CacheKey::new(&FilterOptions::default(), &reported),
			CacheKey::new(&FilterOptions::default(), &PaginationOptions::new(20))
		);
	}

	#[test]
	fn page_position_distinguishes_keys() {
		let filters = FilterOptions::default();
		let first = PaginationOptions::new(20);
		let mut second = first;

		second.page = 2;

		assert_ne!(CacheKey::new(&filters, &first), CacheKey::new(&filters, &second));
		assert_eq!(
			CacheKey::new(&filters, &second).fingerprint(),
			r#"{"page":2,"pageSize":20}"#
		);
	}
}
