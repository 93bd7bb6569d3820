//! Question records and the query state used to page through them.
//!
//! Records arrive from the service as [`RawQuestion`], which may carry the store's `_id`,
//! a plain `id`, or both. [`RawQuestion::normalize`] folds them into the canonical
//! [`Question::id`]; nothing downstream of the gateway ever sees a record without one.

pub mod id;
pub mod query;

pub use id::*;
pub use query::*;

// self
use crate::_prelude::*;

/// Difficulty label attached to a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
	/// Introductory material.
	Easy,
	/// Intermediate material.
	Medium,
	/// Advanced material.
	Hard,
}
impl Difficulty {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Difficulty::Easy => "easy",
			Difficulty::Medium => "medium",
			Difficulty::Hard => "hard",
		}
	}
}
impl Display for Difficulty {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Difficulty {
	type Err = UnknownDifficulty;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"easy" => Ok(Difficulty::Easy),
			"medium" => Ok(Difficulty::Medium),
			"hard" => Ok(Difficulty::Hard),
			_ => Err(UnknownDifficulty(s.to_owned())),
		}
	}
}

/// Error returned when parsing an unknown difficulty label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown difficulty `{0}`.")]
pub struct UnknownDifficulty(pub String);

/// A question as held by the cache store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
	/// Canonical identifier.
	pub id: QuestionId,
	/// Question text.
	pub question: String,
	/// Reference answer.
	pub answer: String,
	/// Category name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Difficulty label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub difficulty: Option<Difficulty>,
	/// Ordered tags.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Creation time.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub created_at: Option<OffsetDateTime>,
	/// Last modification time.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<OffsetDateTime>,
}

/// Identifier as it appears on the wire: document stores use strings, seeded data uses numbers.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
	/// String identifier.
	Text(String),
	/// Numeric identifier.
	Number(i64),
}
impl RawId {
	fn into_question_id(self) -> Result<QuestionId, IdentifierError> {
		match self {
			RawId::Text(value) => QuestionId::try_from(value),
			RawId::Number(value) => QuestionId::new(value.to_string()),
		}
	}
}

/// A question record exactly as the service returns it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
	/// Document-store identifier.
	#[serde(rename = "_id", default)]
	pub object_id: Option<RawId>,
	/// Plain identifier.
	#[serde(default)]
	pub id: Option<RawId>,
	/// Question text.
	pub question: String,
	/// Reference answer.
	pub answer: String,
	/// Category name.
	#[serde(default)]
	pub category: Option<String>,
	/// Difficulty label.
	#[serde(default)]
	pub difficulty: Option<Difficulty>,
	/// Ordered tags; `null` and absence both mean none.
	#[serde(default, deserialize_with = "nullable_tags")]
	pub tags: Vec<String>,
	/// Creation time.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Last modification time.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}
impl RawQuestion {
	/// Folds `_id` (preferred) or `id` into the canonical identifier.
	pub fn normalize(self) -> Result<Question, IdentifierError> {
		let id = self.object_id.or(self.id).ok_or(IdentifierError::Missing)?.into_question_id()?;

		Ok(Question {
			id,
			question: self.question,
			answer: self.answer,
			category: self.category,
			difficulty: self.difficulty,
			tags: self.tags,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}

fn nullable_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros::datetime;
	// self
	use super::*;

	fn raw(value: Value) -> RawQuestion {
		serde_json::from_value(value).expect("Raw question fixture should deserialize.")
	}

	#[test]
	fn object_id_populates_the_canonical_id() {
		let question = raw(json!({
			"_id": "65a1f0c2e4b0a1b2c3d4e5f6",
			"question": "What does a User-Agent header identify?",
			"answer": "The client software.",
			"difficulty": "easy",
			"tags": ["User-Agent"],
			"createdAt": "2024-03-01T08:00:00.000Z"
		}))
		.normalize()
		.expect("Record with `_id` should normalize.");

		assert_eq!(question.id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
		assert_eq!(question.difficulty, Some(Difficulty::Easy));
		assert_eq!(question.created_at, Some(datetime!(2024-03-01 08:00 UTC)));
	}

	#[test]
	fn object_id_wins_over_plain_id_and_numbers_are_accepted() {
		let both = raw(json!({ "_id": "mongo-1", "id": 7, "question": "q", "answer": "a" }))
			.normalize()
			.expect("Record with both identifiers should normalize.");
		let numeric = raw(json!({ "id": 7, "question": "q", "answer": "a", "tags": null }))
			.normalize()
			.expect("Record with a numeric id should normalize.");

		assert_eq!(both.id.as_str(), "mongo-1");
		assert_eq!(numeric.id.as_str(), "7");
		assert!(numeric.tags.is_empty());
	}

	#[test]
	fn records_without_any_identifier_are_rejected() {
		let err = raw(json!({ "question": "q", "answer": "a" }))
			.normalize()
			.expect_err("Record without identifiers should be rejected.");

		assert_eq!(err, IdentifierError::Missing);
	}

	#[test]
	fn difficulty_parses_case_insensitively() {
		assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
		assert!("expert".parse::<Difficulty>().is_err());
		assert_eq!(Difficulty::Medium.to_string(), "medium");
	}
}
